//! A conformance-test driver for WebAssembly engines.
//!
//! specrun reads the JSON command scripts produced by `wast2json` from the
//! official specification test suite, loads the referenced module binaries
//! into an execution engine, invokes exported functions, reads exported
//! globals and checks the results. Each command is reported by its source
//! line; the run stops at the first failure.
//!
//! # Modules
//!
//! - [`script`] -- Script data model and the literal codec.
//! - [`runtime`] -- The engine boundary, instance registry, import stub and
//!   the wasmtime-backed engine.
//! - [`runner`] -- The command dispatcher.
//! - [`report`] -- Per-command outcome records.
//!
//! # Example
//!
//! ```no_run
//! use specrun::report::Reporter;
//! use specrun::runner::Runner;
//! use specrun::runtime::WasmtimeEngine;
//! use specrun::script::Script;
//! use std::path::Path;
//!
//! let path = Path::new("tests/fixtures/basic.json");
//! let script = Script::from_path(path).unwrap();
//! let mut runner = Runner::for_script(WasmtimeEngine::new(), path);
//! runner.run(&script, &mut Reporter::stdout()).unwrap();
//! ```

pub mod report;
pub mod runner;
pub mod runtime;
pub mod script;
