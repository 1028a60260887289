use std::cmp::Ordering;

use crate::aggregation::WorkerTable;
use crate::model::WorkerProfile;

/// Profiles ordered by gold volume, busiest first.
pub fn profiles_by_volume(profiles: &WorkerTable) -> Vec<WorkerProfile> {
    let mut ordered = profiles.to_vec();
    ordered.sort_by(|left, right| {
        right
            .gold_ratings_count
            .cmp(&left.gold_ratings_count)
            .then_with(|| left.worker_id.cmp(&right.worker_id))
    });
    ordered
}

/// Most accurate workers among those with enough gold ratings to judge.
pub fn most_accurate_workers(
    profiles: &WorkerTable,
    min_gold_ratings: u32,
    limit: usize,
) -> Vec<WorkerProfile> {
    let mut eligible = profiles
        .iter()
        .filter(|profile| profile.gold_ratings_count >= min_gold_ratings)
        .cloned()
        .collect::<Vec<WorkerProfile>>();

    eligible.sort_by(|left, right| {
        right
            .accuracy
            .total_cmp(&left.accuracy)
            .then_with(|| right.gold_ratings_count.cmp(&left.gold_ratings_count))
            .then_with(|| left.worker_id.cmp(&right.worker_id))
    });
    eligible.truncate(limit);
    eligible
}

/// Pearson correlation between gold volume and accuracy.
pub fn volume_accuracy_correlation(profiles: &WorkerTable) -> Option<f64> {
    let pairs = profiles
        .iter()
        .map(|profile| (f64::from(profile.gold_ratings_count), profile.accuracy))
        .collect::<Vec<(f64, f64)>>();
    pearson(&pairs)
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0_f64;
    let mut variance_x = 0.0_f64;
    let mut variance_y = 0.0_f64;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    match denominator.partial_cmp(&0.0) {
        Some(Ordering::Greater) => Some((covariance / denominator).clamp(-1.0, 1.0)),
        _ => None,
    }
}
