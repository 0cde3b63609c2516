use clap::Parser;
use specrun::report::Reporter;
use specrun::runner::Runner;
use specrun::runtime::{LoadConfig, WasmtimeEngine, DEFAULT_MAX_MEMORY_PAGES};
use specrun::script::Script;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "specrun")]
#[command(about = "Run a wast2json conformance script against the WebAssembly engine")]
struct Cli {
    /// Path to the JSON command script
    script: PathBuf,

    /// Linear memory limit for loaded modules, in 64KiB pages
    #[arg(long, default_value_t = DEFAULT_MAX_MEMORY_PAGES)]
    max_memory_pages: u32,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "specrun=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let script = match Script::from_path(&cli.script) {
        Ok(script) => script,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let config = LoadConfig {
        max_memory_pages: cli.max_memory_pages,
    };
    let mut runner = Runner::for_script(WasmtimeEngine::new(), &cli.script).with_config(config);
    if let Err(e) = runner.run(&script, &mut Reporter::stdout()) {
        error!("{}: {e}", cli.script.display());
        std::process::exit(1);
    }
}
