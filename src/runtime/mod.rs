//! Execution engine boundary
//!
//! The harness drives an engine through two traits: [`Engine`] turns module
//! bytes into a [`ModuleInstance`], and the instance exposes its exported
//! functions and globals. All numeric values cross the boundary as a single
//! `i64` container; interpretation is left to the caller.

pub mod imports;
pub mod registry;
pub mod test_utils;
pub mod wasmtime_engine;

pub use imports::{HostFunction, ImportError, ImportResolver, UnsupportedImports};
pub use registry::{InstanceId, InstanceRegistry, RegistryError};
pub use wasmtime_engine::{WasmtimeEngine, WasmtimeInstance};

/// Linear memory page size in bytes.
pub const PAGE_SIZE: u64 = 65536;

/// Maximum linear memory granted to loaded modules by default, in pages.
pub const DEFAULT_MAX_MEMORY_PAGES: u32 = 1024;

/// Engine configuration applied to every module load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadConfig {
    /// Upper bound on linear memory, in 64KiB pages.
    pub max_memory_pages: u32,
}

impl LoadConfig {
    pub fn max_memory_bytes(&self) -> u64 {
        u64::from(self.max_memory_pages) * PAGE_SIZE
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            max_memory_pages: DEFAULT_MAX_MEMORY_PAGES,
        }
    }
}

/// Identifier of an exported function within one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

/// Identifier of an exported global within one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId(pub u32);

/// An engine capable of loading self-contained modules.
pub trait Engine {
    type Instance: ModuleInstance;

    /// Compile, validate, link and instantiate `bytes`.
    ///
    /// Any import the module declares must be obtained from `imports`.
    fn load_module(
        &mut self,
        bytes: &[u8],
        config: &LoadConfig,
        imports: &dyn ImportResolver,
    ) -> Result<Self::Instance, EngineError>;
}

/// A loaded, runnable module.
pub trait ModuleInstance {
    fn function_export(&self, name: &str) -> Option<FuncId>;

    fn global_export(&self, name: &str) -> Option<GlobalId>;

    /// Call a function. Functions without results return `0`; functions with
    /// several results return the first.
    fn invoke(&mut self, func: FuncId, args: &[i64]) -> Result<i64, EngineError>;

    /// Current value of a global.
    fn read_global(&mut self, global: GlobalId) -> Result<i64, EngineError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Module load failed: {0}")]
    Load(String),
    #[error("Invocation failed: {0}")]
    Invocation(String),
    #[error("Unknown function id: {0}")]
    UnknownFunction(u32),
    #[error("Unknown global id: {0}")]
    UnknownGlobal(u32),
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),
    #[error(transparent)]
    Import(#[from] ImportError),
}
