use cwrouter_config::get_data_dir;
use eyre::{
    Context as _,
    Result,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};
use tracing_subscriber::{
    fmt,
    prelude::*,
    EnvFilter,
};

lazy_static::lazy_static! {
    static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// The log file is moved aside once it grows past this size. One old file is kept.
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Logs to stderr (message only) and to `cwrouter.log` in the data directory.
///
/// `RUST_LOG` takes precedence over `verbose`.
pub fn log_init(verbose: bool) -> Result<()> {
    let directory = get_data_dir();
    fs::create_dir_all(&directory).context("Failed to create directory")?;
    let log_path = directory.join(LOG_FILE.as_str());
    rotate(&log_path, MAX_LOG_SIZE)?;

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .wrap_err_with(|| format!("Failed to open log file {:?}", log_path))?;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},aws_config=warn,aws_smithy_runtime=warn,hyper=warn")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_level(false)
                .with_target(false),
        )
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(log_file)))
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .context("Failed to initialize tracing subscriber")
}

fn backup_path(log_path: &Path) -> PathBuf {
    let mut name = log_path.as_os_str().to_owned();
    name.push(".1");
    PathBuf::from(name)
}

fn rotate(log_path: &Path, max_size: u64) -> Result<()> {
    match fs::metadata(log_path) {
        Ok(metadata) if metadata.len() > max_size => {
            let backup = backup_path(log_path);
            if backup.exists() {
                fs::remove_file(&backup).wrap_err_with(|| format!("Failed to remove old log file {:?}", backup))?;
            }
            fs::rename(log_path, &backup).wrap_err_with(|| format!("Failed to rotate log file to {:?}", backup))
        }
        _ => Ok(()),
    }
}
