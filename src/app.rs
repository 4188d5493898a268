use crate::{
    publish::{
        CloudWatchPublisher,
        LogPublisher,
        MetricsPublisher,
        PublishError,
    },
    source::{
        DocumentSource,
        HttpDocumentSource,
        StatsLookupError,
    },
};
use cwrouter_config::{
    get_config_dir,
    Args,
    Config,
    StateStore,
};
use cwrouter_stats::{
    delta,
    DocumentParseError,
    StatsSnapshot,
};
use std::{
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Ok = 0,
    Error = 1,
    /// A skeleton config was written and needs to be filled in.
    NoConfig = 2,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The usage since the previous run was published.
    Published(StatsSnapshot),
    /// Nothing was recorded before, so there is no usage to report yet.
    FirstRun,
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("The configuration cannot be used: {0:#}")]
    Config(eyre::Report),
    #[error("The recorded stats cannot be used: {0:#}")]
    State(eyre::Report),
    #[error(transparent)]
    Lookup(#[from] StatsLookupError),
    #[error(transparent)]
    Parse(#[from] DocumentParseError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// One pass over the router: read, compare with the recorded stats, publish
/// the difference and record the new reading.
///
/// The new reading is only recorded once the usage has been accepted, so a
/// failed run is reported again by the next one.
#[instrument(level = "debug", skip_all, fields(namespace = %namespace))]
pub async fn run_once(
    namespace: &str,
    state: &mut StateStore,
    source: &impl DocumentSource,
    publisher: &impl MetricsPublisher,
) -> Result<Outcome, RunError> {
    let last_stats = state.last_stats();
    let document = source.fetch().await?;
    let new_stats = StatsSnapshot::from_document(&document)?;
    debug!(%last_stats, %new_stats, "Read router stats");

    let outcome = match delta(Some(&last_stats), Some(&new_stats)) {
        Ok(usage) => {
            publisher.publish(namespace, &usage).await?;
            info!("{usage}");
            Outcome::Published(usage)
        }
        Err(err) => {
            info!("Nothing to report until the next run ({err})");
            Outcome::FirstRun
        }
    };

    state.update_last_stats(&new_stats);
    state.save().map_err(RunError::State)?;
    Ok(outcome)
}

pub struct App {
    args: Args,
    config_dir: PathBuf,
}

impl App {
    pub fn new(args: Args) -> Self {
        let config_dir = args.config_dir.clone().unwrap_or_else(get_config_dir);
        Self { args, config_dir }
    }

    pub async fn run(&self) -> ExitStatus {
        if Config::is_new(&self.config_dir) {
            return match Config::write_skeleton(&self.config_dir) {
                Ok(path) => {
                    error!(
                        "cwrouter is stopping because you have no config! skeleton written to {}. fill in your credentials.",
                        path.display()
                    );
                    ExitStatus::NoConfig
                }
                Err(err) => {
                    error!("cwrouter has no config and writing a skeleton failed: {err:#}");
                    ExitStatus::Error
                }
            };
        }

        match self.try_run().await {
            Ok(_) => ExitStatus::Ok,
            Err(err) => {
                error!("{err}");
                ExitStatus::Error
            }
        }
    }

    async fn try_run(&self) -> Result<Outcome, RunError> {
        let config = Config::load(&self.config_dir, &self.args).map_err(|e| RunError::Config(eyre::Report::new(e)))?;
        config.validate().map_err(RunError::Config)?;
        let mut state = StateStore::open(&self.config_dir).map_err(RunError::State)?;
        let source = HttpDocumentSource::new(&config.stats_url, Duration::from_secs(config.timeout_secs));

        if self.args.dry_run {
            return run_once(&config.namespace, &mut state, &source, &LogPublisher).await;
        }

        let (access_key_id, secret_access_key) = config.credentials().map_err(RunError::Config)?;
        let publisher = CloudWatchPublisher::new(access_key_id, secret_access_key, &config.aws_region);
        run_once(&config.namespace, &mut state, &source, &publisher).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwrouter_stats::Counter;
    use pretty_assertions::assert_eq;
    use std::{
        future::Future,
        pin::Pin,
        sync::Mutex,
    };
    use temp_dir::TempDir;

    const STATISTICS_PAGE: &str = include_str!("../stats/tests/fixtures/ethernet_statistics.html");

    enum StaticSource {
        Page(&'static str),
        Unreachable,
    }

    impl DocumentSource for StaticSource {
        fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<String, StatsLookupError>> + Send + '_>> {
            Box::pin(async move {
                match self {
                    StaticSource::Page(page) => Ok(page.to_string()),
                    StaticSource::Unreachable => Err(StatsLookupError::Status {
                        url: "http://192.168.1.254/".to_string(),
                        status: reqwest::StatusCode::NOT_FOUND,
                    }),
                }
            })
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        fail: bool,
        published: Mutex<Vec<(String, Vec<(Counter, u64)>)>>,
    }

    impl RecordingPublisher {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn published(&self) -> Vec<(String, Vec<(Counter, u64)>)> {
            self.published.lock().unwrap().clone()
        }
    }

    impl MetricsPublisher for RecordingPublisher {
        fn publish<'a>(
            &'a self,
            namespace: &'a str,
            stats: &'a StatsSnapshot,
        ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
            Box::pin(async move {
                if self.fail {
                    return Err(PublishError::CloudWatch("throttled".to_string()));
                }
                self.published
                    .lock()
                    .unwrap()
                    .push((namespace.to_string(), stats.counters().collect()));
                Ok(())
            })
        }
    }

    fn state_with(dir: &TempDir, stats: Option<StatsSnapshot>) -> StateStore {
        let mut state = StateStore::open(dir.path()).unwrap();
        if let Some(stats) = stats {
            state.update_last_stats(&stats);
            state.save().unwrap();
        }
        state
    }

    fn page_stats() -> StatsSnapshot {
        StatsSnapshot::from_counters(1740360955, 328481009)
    }

    #[tokio::test]
    async fn first_run_records_without_publishing() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, None);
        let publisher = RecordingPublisher::default();

        let outcome = run_once("cwrouter", &mut state, &StaticSource::Page(STATISTICS_PAGE), &publisher)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::FirstRun);
        assert!(publisher.published().is_empty());
        assert_eq!(StateStore::open(dir.path()).unwrap().last_stats(), page_stats());
    }

    #[tokio::test]
    async fn publishes_usage_since_last_run() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, Some(StatsSnapshot::from_counters(1740000000, 328000000)));
        let publisher = RecordingPublisher::default();

        let outcome = run_once("home", &mut state, &StaticSource::Page(STATISTICS_PAGE), &publisher)
            .await
            .unwrap();

        let usage = StatsSnapshot::from_counters(360955, 481009);
        assert_eq!(outcome, Outcome::Published(usage));
        assert_eq!(
            publisher.published(),
            vec![(
                "home".to_string(),
                vec![
                    (Counter::ReceivedBytes, 360955),
                    (Counter::TransmittedBytes, 481009),
                    (Counter::TotalBytes, 360955 + 481009),
                ]
            )]
        );
        assert_eq!(StateStore::open(dir.path()).unwrap().last_stats(), page_stats());
    }

    #[tokio::test]
    async fn publishes_current_reading_after_router_reset() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, Some(StatsSnapshot::from_counters(9_000_000_000, 9_000_000_000)));
        let publisher = RecordingPublisher::default();

        let outcome = run_once("cwrouter", &mut state, &StaticSource::Page(STATISTICS_PAGE), &publisher)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Published(page_stats()));
        assert_eq!(StateStore::open(dir.path()).unwrap().last_stats(), page_stats());
    }

    #[tokio::test]
    async fn lookup_failure_keeps_the_recorded_stats() {
        let dir = TempDir::new().unwrap();
        let recorded = StatsSnapshot::from_counters(1, 1);
        let mut state = state_with(&dir, Some(recorded));
        let publisher = RecordingPublisher::default();

        let err = run_once("cwrouter", &mut state, &StaticSource::Unreachable, &publisher)
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Lookup(_)), "{err:?}");
        assert!(publisher.published().is_empty());
        assert_eq!(StateStore::open(dir.path()).unwrap().last_stats(), recorded);
    }

    #[tokio::test]
    async fn unexpected_page_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with(&dir, None);
        let publisher = RecordingPublisher::default();

        let err = run_once(
            "cwrouter",
            &mut state,
            &StaticSource::Page("<html><body>Login required</body></html>"),
            &publisher,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::Parse(_)), "{err:?}");
        assert!(StateStore::open(dir.path()).unwrap().last_stats().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_recorded_stats() {
        let dir = TempDir::new().unwrap();
        let recorded = StatsSnapshot::from_counters(1, 1);
        let mut state = state_with(&dir, Some(recorded));

        let err = run_once(
            "cwrouter",
            &mut state,
            &StaticSource::Page(STATISTICS_PAGE),
            &RecordingPublisher::failing(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::Publish(_)), "{err:?}");
        assert_eq!(StateStore::open(dir.path()).unwrap().last_stats(), recorded);
    }

    #[tokio::test]
    async fn missing_config_writes_a_skeleton() {
        let dir = TempDir::new().unwrap();
        let app = App::new(Args {
            config_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });

        assert_eq!(app.run().await, ExitStatus::NoConfig);
        assert!(!Config::is_new(dir.path()));
        assert_eq!(
            Config::load(dir.path(), &Args::default()).unwrap(),
            Config::default()
        );
    }

    #[tokio::test]
    async fn unusable_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        Config::write_skeleton(dir.path()).unwrap();
        let app = App::new(Args {
            config_dir: Some(dir.path().to_path_buf()),
            stats_url: Some("not a url".to_string()),
            ..Default::default()
        });

        assert_eq!(app.run().await, ExitStatus::Error);
        assert!(StateStore::open(dir.path()).unwrap().last_stats().is_empty());
    }

    #[tokio::test]
    async fn placeholder_credentials_are_an_error() {
        let dir = TempDir::new().unwrap();
        Config::write_skeleton(dir.path()).unwrap();
        let app = App::new(Args {
            config_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });

        let err = app.try_run().await.unwrap_err();
        assert!(matches!(err, RunError::Config(_)), "{err:?}");
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitStatus::Ok as u8, 0);
        assert_eq!(ExitStatus::Error as u8, 1);
        assert_eq!(ExitStatus::NoConfig as u8, 2);
    }
}
