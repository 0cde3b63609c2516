//! Import resolution for loaded modules
//!
//! Engines ask an [`ImportResolver`] for every function and global a module
//! imports. The harness only runs self-contained modules, so the resolver it
//! installs, [`UnsupportedImports`], refuses every request.

use std::sync::Arc;

/// A host function callable by a module, operating on 64-bit containers.
pub type HostFunction = Arc<dyn Fn(&[i64]) -> Result<i64, String> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("Function import {module}.{field} not supported")]
    UnsupportedFunction { module: String, field: String },
    #[error("Global import {module}.{field} not supported")]
    UnsupportedGlobal { module: String, field: String },
    #[error("Import {module}.{field} of kind {kind} not supported")]
    UnsupportedKind {
        module: String,
        field: String,
        kind: String,
    },
}

/// Supplies values for a module's imports.
pub trait ImportResolver {
    fn resolve_function(&self, module: &str, field: &str) -> Result<HostFunction, ImportError>;

    fn resolve_global(&self, module: &str, field: &str) -> Result<i64, ImportError>;
}

/// Resolver that rejects every import.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedImports;

impl ImportResolver for UnsupportedImports {
    fn resolve_function(&self, module: &str, field: &str) -> Result<HostFunction, ImportError> {
        Err(ImportError::UnsupportedFunction {
            module: module.to_string(),
            field: field.to_string(),
        })
    }

    fn resolve_global(&self, module: &str, field: &str) -> Result<i64, ImportError> {
        Err(ImportError::UnsupportedGlobal {
            module: module.to_string(),
            field: field.to_string(),
        })
    }
}
