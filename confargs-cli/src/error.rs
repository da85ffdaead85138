use std::io;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Parse(#[from] confargs::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Report a fatal error and exit with status 1.
pub fn fatal(err: &CliError) -> ! {
    eprintln!("error: {}", err);
    std::process::exit(1);
}
