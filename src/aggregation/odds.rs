use super::*;

/// Share of gold ratings that matched the truth. Only called for workers with
/// at least one gold rating.
pub fn accuracy_from_counts(correct: u32, ratings: u32) -> f64 {
    debug_assert!(ratings > 0 && correct <= ratings);
    f64::from(correct) / f64::from(ratings)
}

/// Maps accuracy in [0, 1] to odds that compose by multiplication.
/// Strictly increasing, zero at zero, `1 / (K - 1)` at one.
pub fn accuracy_to_odds(accuracy: f64, smoothing: SmoothingConstant) -> f64 {
    accuracy / (smoothing.value() - accuracy)
}
