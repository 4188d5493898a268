#[macro_use]
extern crate tracing;

mod app_dirs;
mod args;
mod state;

pub use app_dirs::{
    get_config_dir,
    get_data_dir,
};
pub use args::Args;
use color_eyre::Result;
use eyre::{
    eyre,
    Context as _,
};
use serde::{
    Deserialize,
    Serialize,
};
pub use state::{
    LastStats,
    StateStore,
};
use std::{
    collections::HashMap,
    path::{
        Path,
        PathBuf,
    },
};

const CONFIG_FILE: &str = "config.json";

/// Value the skeleton config carries for settings the user has to fill in.
pub const PLACEHOLDER: &str = "fill_in";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The router page listing the Ethernet statistics.
    pub stats_url: String,
    /// CloudWatch namespace the metrics are put under.
    pub namespace: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    #[serde(default = "default_aws_region")]
    pub aws_region: String,
    /// Timeout for fetching the statistics page.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_aws_region() -> String {
    "us-east-1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stats_url: "http://192.168.1.254/cgi-bin/dslstatistics.ha".to_string(),
            namespace: app_dirs::APP_NAME.to_string(),
            aws_access_key_id: PLACEHOLDER.to_string(),
            aws_secret_access_key: PLACEHOLDER.to_string(),
            aws_region: default_aws_region(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        cache.insert("stats_url".to_string(), self.stats_url.clone().into());
        cache.insert("namespace".to_string(), self.namespace.clone().into());
        cache.insert("aws_access_key_id".to_string(), self.aws_access_key_id.clone().into());
        cache.insert(
            "aws_secret_access_key".to_string(),
            self.aws_secret_access_key.clone().into(),
        );
        cache.insert("aws_region".to_string(), self.aws_region.clone().into());
        cache.insert("timeout_secs".to_string(), self.timeout_secs.into());
        Ok(cache)
    }
}

/// Bookkeeping written next to the settings in every JSON file we save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub cwrouter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

impl Meta {
    pub(crate) fn new(about: &str) -> Self {
        Self {
            cwrouter: env!("CARGO_PKG_VERSION").to_string(),
            about: Some(about.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ConfigFile<'a> {
    #[serde(flatten)]
    config: &'a Config,
    #[serde(rename = "__meta__")]
    meta: Meta,
}

impl Config {
    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// True until a config file has been written to `config_dir`.
    pub fn is_new(config_dir: &Path) -> bool {
        !Self::path(config_dir).exists()
    }

    /// Layers the defaults, `config.json` and the command line overrides.
    pub fn load(config_dir: &Path, args: &Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(Config::default());

        let source = config::File::from(Self::path(config_dir))
            .format(config::FileFormat::Json)
            .required(false);
        builder = builder.add_source(source);

        builder = builder.add_source(args.clone());

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    /// Writes a config with placeholder credentials for the user to edit.
    pub fn write_skeleton(config_dir: &Path) -> Result<PathBuf> {
        Config::default().save(config_dir)
    }

    pub fn save(&self, config_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        let path = Self::path(config_dir);
        let file = ConfigFile {
            config: self,
            meta: Meta::new("cwrouter configuration file"),
        };
        let mut content = serde_json::to_string_pretty(&file).context("Failed to serialize config")?;
        content.push('\n');
        std::fs::write(&path, content).wrap_err_with(|| format!("Failed to write config to {:?}", path))?;
        Ok(path)
    }

    /// Checks the settings every run needs.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.stats_url).wrap_err_with(|| format!("Invalid stats_url {:?}", self.stats_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(eyre!("stats_url {:?} is not an http(s) URL", self.stats_url));
        }
        if self.namespace.trim().is_empty() {
            return Err(eyre!("namespace must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(eyre!("timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// The AWS key pair, unless the skeleton placeholders are still in place.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        for (name, value) in [
            ("aws_access_key_id", &self.aws_access_key_id),
            ("aws_secret_access_key", &self.aws_secret_access_key),
        ] {
            if value.trim().is_empty() || value == PLACEHOLDER {
                return Err(eyre!("{name} is not set, fill it in before uploading metrics"));
            }
        }
        Ok((&self.aws_access_key_id, &self.aws_secret_access_key))
    }
}
