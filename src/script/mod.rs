//! Conformance script loading and literal handling.
//!
//! Scripts are the JSON form of the WebAssembly specification tests as
//! produced by `wast2json`: each `.wast` file becomes one `.json` command
//! document plus a set of `.wasm` module binaries next to it.
//!
//! # Example
//!
//! ```
//! use specrun::script::{CommandKind, Script};
//!
//! let script = Script::from_json(r#"{
//!     "source_filename": "add.wast",
//!     "commands": [
//!         {"type": "module", "line": 1, "filename": "add.0.wasm"},
//!         {"type": "assert_return", "line": 4,
//!          "action": {"type": "invoke", "field": "add",
//!                     "args": [{"type": "i32", "value": "2"}, {"type": "i32", "value": "3"}]},
//!          "expected": [{"type": "i32", "value": "5"}]}
//!     ]
//! }"#).unwrap();
//! assert_eq!(script.commands.len(), 2);
//! assert_eq!(script.commands[1].kind, CommandKind::AssertReturn);
//! ```

pub mod command;
pub mod values;

pub use command::*;
pub use values::{check_expected, decode, normalize, Mismatch, ValueError};

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed script: {0}")]
    Json(#[from] serde_json::Error),
}

impl Script {
    /// Read and parse a script document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Script, ScriptError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Script::from_json(&raw)
    }

    /// Parse a script document from JSON text.
    pub fn from_json(raw: &str) -> Result<Script, ScriptError> {
        Ok(serde_json::from_str(raw)?)
    }
}
