//! Gold-calibrated label aggregation.
//!
//! Labels are split into gold and unknown items, workers are scored by their
//! hit rate on gold, the scores are turned into odds, and the odds of every
//! reliable vote are multiplied per (item, category) to pick a prediction.
//! The same pipeline run under two reliability quantiles is cross-tabulated
//! to see how sensitive the predictions are to the cutoff.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::debug;

use crate::cli::TiePolicy;
use crate::model::{Category, ComparisonMatrix, GoldItem, ItemPrediction, Label, WorkerProfile};

mod config;
mod evidence;
mod gold_accuracy;
mod odds;
mod pipeline;
mod reliability;
mod sensitivity;

pub use config::{AggregationConfig, DEFAULT_SMOOTHING, Quantile, SmoothingConstant};
pub use evidence::{CategoryEvidence, overall_odds, select_top_categories};
pub use gold_accuracy::{GoldSet, PartitionedLabels, WorkerTable, estimate_worker_profiles};
pub use odds::{accuracy_from_counts, accuracy_to_odds};
pub use pipeline::{Calibration, SensitivityReport, ThresholdRun};
pub use reliability::{VolumeCutoff, reliability_threshold, reliable_workers};
pub use sensitivity::compare_predictions;
