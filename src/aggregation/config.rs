use super::*;

pub const DEFAULT_SMOOTHING: f64 = 1.001;

/// The `K` in `odds = accuracy / (K - accuracy)`. Always finite and above 1,
/// so a perfect worker still gets finite odds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothingConstant(f64);

impl SmoothingConstant {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 1.0 {
            bail!("smoothing constant must be finite and greater than 1, got {value}");
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SmoothingConstant {
    fn default() -> Self {
        Self(DEFAULT_SMOOTHING)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quantile(f64);

impl Quantile {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            bail!("quantile must be within [0, 1], got {value}");
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct AggregationConfig {
    pub smoothing: SmoothingConstant,
    pub tie_policy: TiePolicy,
}

impl AggregationConfig {
    pub fn new(smoothing: f64, tie_policy: TiePolicy) -> Result<Self> {
        let smoothing = SmoothingConstant::new(smoothing).context("invalid aggregation config")?;
        Ok(Self {
            smoothing,
            tie_policy,
        })
    }
}
