//! Publication of the usage figures to the metrics backend.

use aws_sdk_cloudwatch::{
    config::{
        BehaviorVersion,
        Credentials,
        Region,
    },
    error::DisplayErrorContext,
    types::{
        MetricDatum,
        StandardUnit,
    },
    Client,
};
use cwrouter_stats::StatsSnapshot;
use std::{
    future::Future,
    pin::Pin,
};

/// The metrics backend did not accept the data points.
#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error("there was an error putting metrics to CloudWatch: {0}")]
    CloudWatch(String),
}

/// Publishes every counter of a snapshot as one data point, in bytes.
pub trait MetricsPublisher {
    fn publish<'a>(
        &'a self,
        namespace: &'a str,
        stats: &'a StatsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>>;
}

/// Puts the metrics into AWS CloudWatch.
pub struct CloudWatchPublisher {
    client: Client,
}

impl CloudWatchPublisher {
    pub fn new(access_key_id: &str, secret_access_key: &str, region: &str) -> Self {
        let credentials = Credentials::new(access_key_id, secret_access_key, None, None, "cwrouter-config");
        let config = aws_sdk_cloudwatch::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(config),
        }
    }
}

impl MetricsPublisher for CloudWatchPublisher {
    fn publish<'a>(
        &'a self,
        namespace: &'a str,
        stats: &'a StatsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        Box::pin(async move {
            let metric_data = stats
                .counters()
                .map(|(counter, value)| {
                    MetricDatum::builder()
                        .metric_name(counter.as_str())
                        .value(value as f64)
                        .unit(StandardUnit::Bytes)
                        .build()
                })
                .collect::<Vec<_>>();
            debug!(namespace, count = metric_data.len(), "Putting metric data");

            self.client
                .put_metric_data()
                .namespace(namespace)
                .set_metric_data(Some(metric_data))
                .send()
                .await
                .map_err(|e| PublishError::CloudWatch(DisplayErrorContext(&e).to_string()))?;
            Ok(())
        })
    }
}

/// Logs the data points instead of sending them anywhere.
#[derive(Debug, Default)]
pub struct LogPublisher;

impl MetricsPublisher for LogPublisher {
    fn publish<'a>(
        &'a self,
        namespace: &'a str,
        stats: &'a StatsSnapshot,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        Box::pin(async move {
            for (counter, value) in stats.counters() {
                info!(namespace, metric = %counter, value, unit = "Bytes", "dry run, not sending");
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_publisher_accepts_everything() {
        let stats = StatsSnapshot::from_counters(7, 7);
        LogPublisher.publish("cwrouter", &stats).await.unwrap();
        LogPublisher.publish("cwrouter", &StatsSnapshot::empty()).await.unwrap();
    }

    #[tokio::test]
    async fn cloudwatch_publisher_builds_offline() {
        let _publisher = CloudWatchPublisher::new("AKIDEXAMPLE", "secret", "eu-west-1");
    }
}
