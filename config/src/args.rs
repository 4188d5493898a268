use clap::Parser;
use std::{
    collections::HashMap,
    path::PathBuf,
};

/// Upload the traffic used since the last run to CloudWatch.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding `config.json` and `state.json`.
    /// Defaults to $CWROUTER_CONFIG or the platform config directory.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Override the router statistics page for this run.
    #[arg(long)]
    pub stats_url: Option<String>,

    /// Override the CloudWatch namespace for this run.
    #[arg(long)]
    pub namespace: Option<String>,

    /// Log the metrics instead of sending them to CloudWatch.
    /// The recorded stats are still updated.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl config::Source for Args {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        if let Some(stats_url) = &self.stats_url {
            cache.insert("stats_url".to_string(), stats_url.clone().into());
        }
        if let Some(namespace) = &self.namespace {
            cache.insert("namespace".to_string(), namespace.clone().into());
        }
        Ok(cache)
    }
}
