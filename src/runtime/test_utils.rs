//! Test utilities for runtime testing
//!
//! Provides an in-memory [`Engine`](super::Engine) whose modules are described
//! in Rust instead of compiled from bytes, so dispatcher behaviour can be
//! tested without a real engine.

#[cfg(test)]
pub mod test {
    use crate::runtime::{Engine, EngineError, FuncId, GlobalId, ImportResolver, LoadConfig, ModuleInstance};
    use std::collections::HashMap;

    /// Native body of a fake function: arguments, the instance's globals.
    pub type FakeFn = fn(&[i64], &mut [i64]) -> Result<i64, String>;

    /// A module definition. Loading it clones the definition, so every
    /// instance has its own globals.
    #[derive(Clone, Default)]
    pub struct FakeModule {
        functions: Vec<(String, FakeFn)>,
        global_names: Vec<String>,
        globals: Vec<i64>,
        function_imports: Vec<(String, String)>,
        global_imports: Vec<(String, String)>,
    }

    impl FakeModule {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn func(mut self, name: &str, body: FakeFn) -> Self {
            self.functions.push((name.to_string(), body));
            self
        }

        pub fn global(mut self, name: &str, value: i64) -> Self {
            self.global_names.push(name.to_string());
            self.globals.push(value);
            self
        }

        pub fn import_func(mut self, module: &str, field: &str) -> Self {
            self.function_imports.push((module.to_string(), field.to_string()));
            self
        }

        pub fn import_global(mut self, module: &str, field: &str) -> Self {
            self.global_imports.push((module.to_string(), field.to_string()));
            self
        }
    }

    impl ModuleInstance for FakeModule {
        fn function_export(&self, name: &str) -> Option<FuncId> {
            self.functions
                .iter()
                .position(|(n, _)| n == name)
                .map(|idx| FuncId(idx as u32))
        }

        fn global_export(&self, name: &str) -> Option<GlobalId> {
            self.global_names
                .iter()
                .position(|n| n == name)
                .map(|idx| GlobalId(idx as u32))
        }

        fn invoke(&mut self, func: FuncId, args: &[i64]) -> Result<i64, EngineError> {
            let (_, body) = self
                .functions
                .get(func.0 as usize)
                .ok_or(EngineError::UnknownFunction(func.0))?;
            body(args, &mut self.globals).map_err(EngineError::Invocation)
        }

        fn read_global(&mut self, global: GlobalId) -> Result<i64, EngineError> {
            self.globals
                .get(global.0 as usize)
                .copied()
                .ok_or(EngineError::UnknownGlobal(global.0))
        }
    }

    /// Engine that maps module bytes (read as UTF-8 text) to registered
    /// [`FakeModule`] definitions.
    #[derive(Default)]
    pub struct FakeEngine {
        modules: HashMap<String, FakeModule>,
        pub loads: Vec<LoadConfig>,
    }

    impl FakeEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn module(mut self, key: &str, module: FakeModule) -> Self {
            self.modules.insert(key.to_string(), module);
            self
        }
    }

    impl Engine for FakeEngine {
        type Instance = FakeModule;

        fn load_module(
            &mut self,
            bytes: &[u8],
            config: &LoadConfig,
            imports: &dyn ImportResolver,
        ) -> Result<FakeModule, EngineError> {
            let key = String::from_utf8_lossy(bytes);
            let module = self
                .modules
                .get(key.trim())
                .cloned()
                .ok_or_else(|| EngineError::Load(format!("magic header not detected: {key}")))?;
            for (module_name, field) in &module.function_imports {
                imports.resolve_function(module_name, field)?;
            }
            for (module_name, field) in &module.global_imports {
                imports.resolve_global(module_name, field)?;
            }
            self.loads.push(*config);
            Ok(module)
        }
    }

    pub fn add(args: &[i64], _globals: &mut [i64]) -> Result<i64, String> {
        Ok(i64::from((args[0] as i32).wrapping_add(args[1] as i32)))
    }

    /// Increments global 0 and returns its new value.
    pub fn inc(_args: &[i64], globals: &mut [i64]) -> Result<i64, String> {
        globals[0] += 1;
        Ok(globals[0])
    }

    pub fn neg_one(_args: &[i64], _globals: &mut [i64]) -> Result<i64, String> {
        Ok(-1)
    }

    pub fn unreachable(_args: &[i64], _globals: &mut [i64]) -> Result<i64, String> {
        Err("wasm trap: wasm `unreachable` instruction executed".to_string())
    }

    pub fn panics(_args: &[i64], _globals: &mut [i64]) -> Result<i64, String> {
        panic!("engine fault")
    }
}
