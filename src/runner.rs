//! Command dispatcher.
//!
//! A [`Runner`] folds a script's commands, in order, over its instance
//! registry. `module` commands load and register instances, `action` and
//! `assert_return` commands invoke functions or read globals and check the
//! result, and the assertion categories that need engine support the harness
//! does not have are recorded as skipped. The first fatal condition stops the
//! run and is returned to the caller.

use crate::report::{Outcome, Reporter};
use crate::runtime::{
    Engine, EngineError, FuncId, ImportResolver, InstanceRegistry, LoadConfig, ModuleInstance, RegistryError,
    UnsupportedImports,
};
use crate::script::{check_expected, decode, ActionKind, Command, CommandKind, Mismatch, Script, ValueError, ValueLiteral};
use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A fatal condition raised while handling one command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command type: {0}")]
    UnknownCommand(String),
    #[error("unknown action type: {0}")]
    UnknownAction(String),
    #[error("{0} command has no action")]
    MissingAction(CommandKind),
    #[error("module command has no filename")]
    MissingFilename,
    #[error("failed to read module {}: {source}", path.display())]
    ModuleRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("export not found ({kind}): {name}")]
    ExportNotFound { kind: &'static str, name: String },
    #[error("{what} mismatch: got {got}, expected {expected}")]
    Mismatch { what: &'static str, got: i64, expected: i64 },
    #[error("invocation panicked: {0}")]
    InvocationPanicked(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Value(#[from] ValueError),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("L{line}: {source}")]
    Command {
        line: u32,
        #[source]
        source: CommandError,
    },
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}

impl RunError {
    /// The command error behind this failure, if any.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            RunError::Command { source, .. } => Some(source),
            RunError::Report(_) => None,
        }
    }
}

pub struct Runner<E: Engine> {
    engine: E,
    config: LoadConfig,
    imports: Box<dyn ImportResolver>,
    base_dir: PathBuf,
    registry: InstanceRegistry<E::Instance>,
}

impl<E: Engine> Runner<E> {
    /// Create a runner resolving module filenames against `base_dir`.
    pub fn new(engine: E, base_dir: impl Into<PathBuf>) -> Self {
        Runner {
            engine,
            config: LoadConfig::default(),
            imports: Box::new(UnsupportedImports),
            base_dir: base_dir.into(),
            registry: InstanceRegistry::new(),
        }
    }

    /// Create a runner for the script at `script_path`; module filenames are
    /// resolved against the script's directory.
    pub fn for_script(engine: E, script_path: &Path) -> Self {
        let base_dir = script_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Runner::new(engine, base_dir)
    }

    pub fn with_config(mut self, config: LoadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_imports(mut self, imports: Box<dyn ImportResolver>) -> Self {
        self.imports = imports;
        self
    }

    pub fn registry(&self) -> &InstanceRegistry<E::Instance> {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Handle every command of `script` in order, recording each outcome.
    ///
    /// Returns the number of commands handled, or the first fatal error.
    pub fn run<W: Write>(&mut self, script: &Script, reporter: &mut Reporter<W>) -> Result<usize, RunError> {
        debug!(source = %script.source_filename, commands = script.commands.len(), "running script");
        for command in &script.commands {
            let outcome = self.handle(command).map_err(|source| RunError::Command {
                line: command.line,
                source,
            })?;
            reporter.record(command.line, &outcome)?;
        }
        Ok(script.commands.len())
    }

    /// Handle a single command against the current registry state.
    pub fn handle(&mut self, command: &Command) -> Result<Outcome, CommandError> {
        match &command.kind {
            CommandKind::Module => self.load_module(command),
            CommandKind::Action | CommandKind::AssertReturn => self.perform_action(command),
            kind if kind.is_unsupported() => {
                info!(line = command.line, "skipping {kind}");
                Ok(Outcome::Skipped(kind.clone()))
            }
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn load_module(&mut self, command: &Command) -> Result<Outcome, CommandError> {
        let filename = command.filename.as_deref().ok_or(CommandError::MissingFilename)?;
        let path = self.base_dir.join(filename);
        let bytes = std::fs::read(&path).map_err(|source| CommandError::ModuleRead {
            path: path.clone(),
            source,
        })?;

        let instance = self.engine.load_module(&bytes, &self.config, self.imports.as_ref())?;
        let id = self.registry.insert(instance);
        self.registry.set_current(id);
        if let Some(name) = command.name.as_deref().filter(|name| !name.is_empty()) {
            self.registry.bind(name, id);
        }
        debug!(line = command.line, module = %path.display(), name = ?command.name, "module loaded");
        Ok(Outcome::Loaded)
    }

    fn perform_action(&mut self, command: &Command) -> Result<Outcome, CommandError> {
        let action = command
            .action
            .as_ref()
            .ok_or_else(|| CommandError::MissingAction(command.kind.clone()))?;
        let id = self.registry.resolve(action.target_module())?;
        let expected = expected_values(command);
        let instance = self.registry.get_mut(id);

        match &action.kind {
            ActionKind::Invoke => {
                let func = instance
                    .function_export(&action.field)
                    .ok_or_else(|| CommandError::ExportNotFound {
                        kind: "func",
                        name: action.field.clone(),
                    })?;
                let args = action.args.iter().map(decode).collect::<Result<Vec<_>, _>>()?;
                debug!(line = command.line, field = %action.field, entry = func.0, "invoking export");
                let ret = invoke_guarded(instance, func, &args)?;
                compare("ret", ret, expected)?;
            }
            ActionKind::Get => {
                let global = instance
                    .global_export(&action.field)
                    .ok_or_else(|| CommandError::ExportNotFound {
                        kind: "global",
                        name: action.field.clone(),
                    })?;
                let val = instance.read_global(global)?;
                compare("val", val, expected)?;
            }
            ActionKind::Other(kind) => return Err(CommandError::UnknownAction(kind.clone())),
        }
        Ok(Outcome::Passed)
    }
}

/// Expected results for an action: the command's own list, falling back to
/// the list nested in the action.
fn expected_values(command: &Command) -> &[ValueLiteral] {
    match &command.action {
        Some(action) if command.expected.is_empty() => &action.expected,
        _ => &command.expected,
    }
}

fn compare(what: &'static str, actual: i64, expected: &[ValueLiteral]) -> Result<(), CommandError> {
    let first = match expected.first() {
        Some(first) => first,
        None => return Ok(()),
    };
    if expected.len() > 1 {
        warn!(count = expected.len(), "only the first expected value is compared");
    }
    match check_expected(actual, first)? {
        None => Ok(()),
        Some(Mismatch { got, expected }) => Err(CommandError::Mismatch { what, got, expected }),
    }
}

/// Invoke a function, treating a panic inside the engine like a returned
/// invocation error.
fn invoke_guarded<I: ModuleInstance>(instance: &mut I, func: FuncId, args: &[i64]) -> Result<i64, CommandError> {
    match panic::catch_unwind(AssertUnwindSafe(|| instance.invoke(func, args))) {
        Ok(result) => Ok(result?),
        Err(payload) => Err(CommandError::InvocationPanicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
