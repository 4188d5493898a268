use crate::Meta;
use cwrouter_stats::StatsSnapshot;
use eyre::{
    Context as _,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fs,
    io,
    path::{
        Path,
        PathBuf,
    },
};

const STATE_FILE: &str = "state.json";

/// The counters recorded at the end of the previous run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastStats {
    #[serde(default)]
    pub received_bytes: Option<u64>,
    #[serde(default)]
    pub transmitted_bytes: Option<u64>,
    #[serde(default)]
    pub total_bytes: Option<u64>,
}

impl From<&StatsSnapshot> for LastStats {
    fn from(stats: &StatsSnapshot) -> Self {
        Self {
            received_bytes: stats.received_bytes(),
            transmitted_bytes: stats.transmitted_bytes(),
            total_bytes: stats.total_bytes(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    last_stats: LastStats,
    #[serde(rename = "__meta__", default, skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

/// `state.json`, the record of the last counters seen on the router.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: StateFile,
}

impl StateStore {
    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(STATE_FILE)
    }

    /// Reads the state kept in `config_dir`. A missing file means nothing has
    /// been recorded yet.
    pub fn open(config_dir: &Path) -> Result<Self> {
        let path = Self::path(config_dir);
        let state = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).wrap_err_with(|| format!("Invalid state JSON in {:?}", path))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(?path, "No state recorded yet");
                StateFile::default()
            }
            Err(e) => return Err(e).wrap_err_with(|| format!("Failed to read state from {:?}", path)),
        };
        Ok(Self { path, state })
    }

    /// The counters recorded by the previous run, or an empty snapshot.
    pub fn last_stats(&self) -> StatsSnapshot {
        let last = &self.state.last_stats;
        StatsSnapshot::new(last.received_bytes, last.transmitted_bytes)
    }

    pub fn update_last_stats(&mut self, stats: &StatsSnapshot) {
        self.state.last_stats = LastStats::from(stats);
    }

    pub fn save(&mut self) -> Result<()> {
        self.state.meta = Some(Meta::new("cwrouter state"));
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let mut content = serde_json::to_string_pretty(&self.state).context("Failed to serialize state")?;
        content.push('\n');
        fs::write(&self.path, content).wrap_err_with(|| format!("Failed to write state to {:?}", self.path))
    }
}
