//! Common test utilities shared between integration tests

#![allow(dead_code)]

use specrun::report::Reporter;
use specrun::runner::{RunError, Runner};
use specrun::runtime::{LoadConfig, WasmtimeEngine};
use specrun::script::Script;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Captured writer that stores output for testing
pub struct CapturedWriter(pub Arc<Mutex<Vec<u8>>>);

impl Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Run a fixture script through the wasmtime engine, returning the result
/// and everything the reporter wrote.
pub fn run_fixture(name: &str, config: LoadConfig) -> (Result<usize, RunError>, String) {
    let path = fixture(name);
    let script = Script::from_path(&path).unwrap_or_else(|e| panic!("failed to load {name}: {e}"));
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut reporter = Reporter::new(CapturedWriter(buffer.clone()));
    let mut runner = Runner::for_script(WasmtimeEngine::new(), &path).with_config(config);
    let result = runner.run(&script, &mut reporter);
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    (result, output)
}
