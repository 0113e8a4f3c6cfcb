mod completion;
mod repl;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // The terminal program that hosts the viewer window.
    let terminal = std::env::args().nth(1).unwrap_or_else(|| "st".to_string());
    repl::start_repl(&terminal)
}
