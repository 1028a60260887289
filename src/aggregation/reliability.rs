use super::*;

/// Minimum gold-rating volume a worker needs to be trusted.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VolumeCutoff {
    /// Quantile 0: every profiled worker qualifies.
    Unbounded,
    /// Count must be strictly greater than the interpolated quantile.
    Above(f64),
    /// Quantile 1: only workers at the maximum count qualify.
    AtMaximum(u32),
}

impl VolumeCutoff {
    pub fn admits(self, gold_ratings_count: u32) -> bool {
        if gold_ratings_count == 0 {
            return false;
        }
        match self {
            Self::Unbounded => true,
            Self::Above(value) => f64::from(gold_ratings_count) > value,
            Self::AtMaximum(maximum) => gold_ratings_count == maximum,
        }
    }
}

/// Linear interpolation between closest ranks over ascending values.
pub fn interpolated_quantile(sorted: &[u32], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil().min(last as f64) as usize;
    let low_value = f64::from(sorted[lower]);
    let high_value = f64::from(sorted[upper]);
    Some(low_value + (high_value - low_value) * (position - lower as f64))
}

/// Derives the volume cutoff from the current profile population. Returns
/// `None` when no worker has a gold rating.
///
/// Below `q = 1` the comparison stays strict, so when the top counts are tied
/// and the interpolated value lands on them (`[1, 5, 5]` at `0.99` gives
/// `Above(5.0)`) nobody qualifies. Only `q = 1` switches to `AtMaximum`.
pub fn reliability_threshold(profiles: &WorkerTable, quantile: Quantile) -> Option<VolumeCutoff> {
    let mut counts = profiles
        .iter()
        .map(|profile| profile.gold_ratings_count)
        .filter(|count| *count >= 1)
        .collect::<Vec<u32>>();
    if counts.is_empty() {
        return None;
    }
    counts.sort_unstable();

    let q = quantile.value();
    let cutoff = if q == 0.0 {
        VolumeCutoff::Unbounded
    } else if q == 1.0 {
        VolumeCutoff::AtMaximum(counts[counts.len() - 1])
    } else {
        VolumeCutoff::Above(interpolated_quantile(&counts, q)?)
    };
    Some(cutoff)
}

pub fn reliable_workers(profiles: &WorkerTable, cutoff: VolumeCutoff) -> BTreeSet<String> {
    profiles
        .iter()
        .filter(|profile| cutoff.admits(profile.gold_ratings_count))
        .map(|profile| profile.worker_id.clone())
        .collect()
}
