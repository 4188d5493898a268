use crate::{
    EmptyStatsError,
    Operand,
    StatsSnapshot,
};

/// Usage accrued between two readings of the router counters.
///
/// When every counter grew (`previous < current`) the result is the
/// difference. Otherwise the router is assumed to have reset its counters
/// since `previous` was taken, and the current reading is reported as the
/// whole usage since an implicit zero. This applies as soon as a single
/// counter fails to grow, including when the counters did not move at all.
///
/// Fails with [`EmptyStatsError`] if either side is missing or empty.
pub fn delta(
    previous: Option<&StatsSnapshot>,
    current: Option<&StatsSnapshot>,
) -> Result<StatsSnapshot, EmptyStatsError> {
    let [prev_received, prev_transmitted] = base(previous, Operand::Previous)?;
    let [received, transmitted] = base(current, Operand::Current)?;

    // Both sides are non-empty, so `<` is the conjunctive ordering.
    if previous < current {
        Ok(StatsSnapshot::from_counters(
            received - prev_received,
            transmitted - prev_transmitted,
        ))
    } else {
        Ok(StatsSnapshot::from_counters(received, transmitted))
    }
}

fn base(stats: Option<&StatsSnapshot>, operand: Operand) -> Result<[u64; 2], EmptyStatsError> {
    stats
        .and_then(StatsSnapshot::base)
        .ok_or(EmptyStatsError { operand })
}
