mod arguments;
mod error;

use std::io::Write;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use arguments::Outcome;

fn init_logging() {
    let filter = EnvFilter::try_from_env("CONFARGS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn run() -> error::Result<()> {
    let outcome = arguments::parse_args(std::env::args_os().collect())?;
    if let Outcome::Parsed(cmdline) = outcome {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        cmdline.render(&mut out)?;
        out.flush()?;
    }
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        error::fatal(&e);
    }
}
