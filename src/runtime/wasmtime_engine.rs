//! [`Engine`] binding backed by wasmtime
//!
//! Each loaded module gets its own [`Store`], so instances never share state.
//! Linear memory is capped through the store's resource limiter, and every
//! import is routed through the harness's [`ImportResolver`].

use super::{Engine, EngineError, FuncId, GlobalId, ImportError, ImportResolver, LoadConfig, ModuleInstance};
use std::collections::HashMap;
use wasmtime::{ExternType, Func, Global, Linker, Module, Store, StoreLimits, StoreLimitsBuilder, Val, ValType};

/// Per-store host state.
struct HostState {
    limits: StoreLimits,
}

pub struct WasmtimeEngine {
    engine: wasmtime::Engine,
}

impl WasmtimeEngine {
    pub fn new() -> Self {
        WasmtimeEngine {
            engine: wasmtime::Engine::default(),
        }
    }
}

impl Default for WasmtimeEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub struct WasmtimeInstance {
    store: Store<HostState>,
    functions: Vec<Func>,
    function_names: HashMap<String, FuncId>,
    globals: Vec<Global>,
    global_names: HashMap<String, GlobalId>,
}

impl Engine for WasmtimeEngine {
    type Instance = WasmtimeInstance;

    fn load_module(
        &mut self,
        bytes: &[u8],
        config: &LoadConfig,
        imports: &dyn ImportResolver,
    ) -> Result<WasmtimeInstance, EngineError> {
        let module = Module::new(&self.engine, bytes).map_err(load_error)?;

        let limits = StoreLimitsBuilder::new()
            .memory_size(config.max_memory_bytes() as usize)
            .build();
        let mut store = Store::new(&self.engine, HostState { limits });
        store.limiter(|state| &mut state.limits);

        let mut linker: Linker<HostState> = Linker::new(&self.engine);
        for import in module.imports() {
            let (module_name, field) = (import.module(), import.name());
            match import.ty() {
                ExternType::Func(func_type) => {
                    let host = imports.resolve_function(module_name, field)?;
                    let result_types: Vec<ValType> = func_type.results().collect();
                    linker
                        .func_new(module_name, field, func_type, move |_caller, params, results| {
                            let args = params.iter().map(val_to_container).collect::<Result<Vec<_>, _>>()?;
                            let ret = host(&args).map_err(wasmtime::Error::msg)?;
                            for (slot, ty) in results.iter_mut().zip(&result_types) {
                                *slot = container_to_val(ret, ty)?;
                            }
                            Ok(())
                        })
                        .map_err(load_error)?;
                }
                ExternType::Global(global_type) => {
                    let raw = imports.resolve_global(module_name, field)?;
                    let value = container_to_val(raw, global_type.content())?;
                    let global = Global::new(&mut store, global_type, value).map_err(load_error)?;
                    linker.define(&store, module_name, field, global).map_err(load_error)?;
                }
                other => {
                    return Err(ImportError::UnsupportedKind {
                        module: module_name.to_string(),
                        field: field.to_string(),
                        kind: extern_kind(&other).to_string(),
                    }
                    .into())
                }
            }
        }

        let instance = linker.instantiate(&mut store, &module).map_err(load_error)?;

        let mut functions = Vec::new();
        let mut function_names = HashMap::new();
        let mut globals = Vec::new();
        let mut global_names = HashMap::new();
        for export in module.exports() {
            let name = export.name();
            match export.ty() {
                ExternType::Func(_) => {
                    if let Some(func) = instance.get_func(&mut store, name) {
                        function_names.insert(name.to_string(), FuncId(functions.len() as u32));
                        functions.push(func);
                    }
                }
                ExternType::Global(_) => {
                    if let Some(global) = instance.get_global(&mut store, name) {
                        global_names.insert(name.to_string(), GlobalId(globals.len() as u32));
                        globals.push(global);
                    }
                }
                _ => {}
            }
        }

        Ok(WasmtimeInstance {
            store,
            functions,
            function_names,
            globals,
            global_names,
        })
    }
}

impl ModuleInstance for WasmtimeInstance {
    fn function_export(&self, name: &str) -> Option<FuncId> {
        self.function_names.get(name).copied()
    }

    fn global_export(&self, name: &str) -> Option<GlobalId> {
        self.global_names.get(name).copied()
    }

    fn invoke(&mut self, func: FuncId, args: &[i64]) -> Result<i64, EngineError> {
        let function = *self
            .functions
            .get(func.0 as usize)
            .ok_or(EngineError::UnknownFunction(func.0))?;
        let func_type = function.ty(&self.store);

        if func_type.params().len() != args.len() {
            return Err(EngineError::Invocation(format!(
                "expected {} arguments, got {}",
                func_type.params().len(),
                args.len()
            )));
        }
        let params = func_type
            .params()
            .zip(args)
            .map(|(ty, raw)| container_to_val(*raw, &ty))
            .collect::<Result<Vec<_>, _>>()?;
        let mut results = vec![Val::I32(0); func_type.results().len()];

        function
            .call(&mut self.store, &params, &mut results)
            .map_err(|e| EngineError::Invocation(format!("{e:#}")))?;

        match results.first() {
            Some(value) => val_to_container(value),
            None => Ok(0),
        }
    }

    fn read_global(&mut self, global: GlobalId) -> Result<i64, EngineError> {
        let handle = self
            .globals
            .get(global.0 as usize)
            .ok_or(EngineError::UnknownGlobal(global.0))?;
        let value = handle.get(&mut self.store);
        val_to_container(&value)
    }
}

fn load_error(e: wasmtime::Error) -> EngineError {
    EngineError::Load(format!("{e:#}"))
}

fn extern_kind(ty: &ExternType) -> &'static str {
    match ty {
        ExternType::Func(_) => "func",
        ExternType::Global(_) => "global",
        ExternType::Table(_) => "table",
        ExternType::Memory(_) => "memory",
        #[allow(unreachable_patterns)]
        _ => "unknown",
    }
}

/// Widen a value into the 64-bit container. `i32` is sign-extended; float
/// bit patterns are zero-extended.
fn val_to_container(value: &Val) -> Result<i64, EngineError> {
    match value {
        Val::I32(v) => Ok(i64::from(*v)),
        Val::I64(v) => Ok(*v),
        Val::F32(bits) => Ok(i64::from(*bits)),
        Val::F64(bits) => Ok(*bits as i64),
        _ => Err(EngineError::UnsupportedType("reference or vector value".to_string())),
    }
}

/// Narrow a 64-bit container to a value of type `ty`.
fn container_to_val(raw: i64, ty: &ValType) -> Result<Val, EngineError> {
    match ty {
        ValType::I32 => Ok(Val::I32(raw as i32)),
        ValType::I64 => Ok(Val::I64(raw)),
        ValType::F32 => Ok(Val::F32(raw as u32)),
        ValType::F64 => Ok(Val::F64(raw as u64)),
        other => Err(EngineError::UnsupportedType(format!("{other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Val::I32(-1), -1)]
    #[case(Val::I32(5), 5)]
    #[case(Val::I64(i64::MIN), i64::MIN)]
    #[case(Val::F32(0x8000_0000), 0x8000_0000)]
    #[case(Val::F64(u64::MAX), -1)]
    fn test_val_to_container(#[case] value: Val, #[case] expected: i64) {
        assert_eq!(val_to_container(&value).unwrap(), expected);
    }

    #[test]
    fn test_container_to_val_truncates_narrow_types() {
        match container_to_val(0x1_0000_0005, &ValType::I32).unwrap() {
            Val::I32(v) => assert_eq!(v, 5),
            other => panic!("unexpected {other:?}"),
        }
        match container_to_val(-1, &ValType::F32).unwrap() {
            Val::F32(bits) => assert_eq!(bits, u32::MAX),
            other => panic!("unexpected {other:?}"),
        }
        match container_to_val(-1, &ValType::F64).unwrap() {
            Val::F64(bits) => assert_eq!(bits, u64::MAX),
            other => panic!("unexpected {other:?}"),
        }
    }
}
