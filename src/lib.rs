//! # cwrouter
//!
//! Reads the traffic counters off a router's statistics page and puts the
//! usage since the previous run into CloudWatch. Meant to be run from cron or
//! a systemd timer, one pass per invocation.
//!
//! - **`app`**: the run itself and its exit statuses
//! - **`source`**: fetching the statistics page
//! - **`publish`**: sending the usage to CloudWatch (or to the log)
//! - **`logging`**: stderr and log file setup
//!
//! The counter model lives in `cwrouter-stats`, the config and recorded state
//! in `cwrouter-config`.

#[macro_use]
extern crate tracing;

mod app;
pub mod logging;
pub mod publish;
pub mod source;

pub use app::{
    run_once,
    App,
    ExitStatus,
    Outcome,
    RunError,
};
pub use cwrouter_config::Args;

pub fn init_errors() -> color_eyre::Result<()> {
    color_eyre::install()
}
