use crate::{
    delta,
    EmptyStatsError,
};
use std::{
    cmp::Ordering,
    fmt,
};

/// An integer counter exposed by [`StatsSnapshot::counters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    ReceivedBytes,
    TransmittedBytes,
    TotalBytes,
}

impl Counter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::ReceivedBytes => "received_bytes",
            Counter::TransmittedBytes => "transmitted_bytes",
            Counter::TotalBytes => "total_bytes",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative traffic counters read from the router at one point in time.
///
/// The received and transmitted byte counts are the base counters. The total
/// and the receive/transmit ratio are derived from them when the snapshot is
/// built and are absent whenever a base counter is absent.
///
/// A snapshot missing any base counter is *empty*. Empty snapshots stand in
/// for "nothing recorded yet" and are rejected by [`delta`](crate::delta).
///
/// Equality and ordering only look at the base counters:
///
/// - `a == b` when both base counters match.
/// - `a < b` when *every* base counter of `a` is strictly smaller than the one
///   in `b`. Snapshots whose counters moved in different directions are not
///   ordered either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSnapshot {
    received_bytes: Option<u64>,
    transmitted_bytes: Option<u64>,
    total_bytes: Option<u64>,
    ratio: Option<f64>,
}

impl StatsSnapshot {
    /// Builds a snapshot from raw counter values. Leaving out either counter
    /// gives an empty snapshot.
    pub fn new(received_bytes: Option<u64>, transmitted_bytes: Option<u64>) -> Self {
        let (total_bytes, ratio) = match (received_bytes, transmitted_bytes) {
            (Some(received), Some(transmitted)) => {
                let ratio = (transmitted > 0).then(|| received as f64 / transmitted as f64);
                (Some(received.saturating_add(transmitted)), ratio)
            }
            _ => (None, None),
        };

        Self {
            received_bytes,
            transmitted_bytes,
            total_bytes,
            ratio,
        }
    }

    pub fn from_counters(received_bytes: u64, transmitted_bytes: u64) -> Self {
        Self::new(Some(received_bytes), Some(transmitted_bytes))
    }

    pub fn empty() -> Self {
        Self::new(None, None)
    }

    pub fn is_empty(&self) -> bool {
        self.base().is_none()
    }

    pub fn received_bytes(&self) -> Option<u64> {
        self.received_bytes
    }

    pub fn transmitted_bytes(&self) -> Option<u64> {
        self.transmitted_bytes
    }

    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Received bytes per transmitted byte. Absent when nothing was
    /// transmitted.
    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    /// Every integer counter that has a value, in a fixed order.
    pub fn counters(&self) -> impl Iterator<Item = (Counter, u64)> {
        [
            (Counter::ReceivedBytes, self.received_bytes),
            (Counter::TransmittedBytes, self.transmitted_bytes),
            (Counter::TotalBytes, self.total_bytes),
        ]
        .into_iter()
        .filter_map(|(counter, value)| value.map(|value| (counter, value)))
    }

    /// Usage accrued since `previous`. See [`delta`](crate::delta).
    pub fn delta_since(&self, previous: &StatsSnapshot) -> Result<StatsSnapshot, EmptyStatsError> {
        delta(Some(previous), Some(self))
    }

    /// The base counters, if all of them are present.
    pub(crate) fn base(&self) -> Option<[u64; 2]> {
        Some([self.received_bytes?, self.transmitted_bytes?])
    }
}

impl PartialEq for StatsSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.received_bytes == other.received_bytes && self.transmitted_bytes == other.transmitted_bytes
    }
}

impl Eq for StatsSnapshot {}

impl PartialOrd for StatsSnapshot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        let (lhs, rhs) = (self.base()?, other.base()?);
        let pairs = || lhs.iter().zip(rhs.iter());

        if pairs().all(|(l, r)| l < r) {
            Some(Ordering::Less)
        } else if pairs().all(|(l, r)| l > r) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<empty stats>");
        }
        let mut first = true;
        for (counter, value) in self.counters() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{counter}={value}")?;
            first = false;
        }
        if let Some(ratio) = self.ratio {
            write!(f, " ratio={ratio:.3}")?;
        }
        Ok(())
    }
}
