use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::aggregation::{AggregationConfig, Calibration};
use crate::cli::{InputArgs, TiePolicy};
use crate::input::{load_gold_table, load_label_table};
use crate::model::{InputFileSummary, RunConfigSummary, RunCounts, RunManifest};
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

/// Inputs ingested and calibrated once per command invocation.
pub(super) struct Session {
    pub run_id: String,
    pub calibration: Calibration,
    pub inputs: Vec<InputFileSummary>,
    pub counts: RunCounts,
    pub warnings: Vec<String>,
    pub on_malformed: String,
}

impl Session {
    pub fn open(input: &InputArgs, tie_policy: TiePolicy) -> Result<Self> {
        let run_id = format!("run-{}", utc_compact_string(Utc::now()));
        let config = AggregationConfig::new(input.smoothing, tie_policy)?;

        info!(
            run_id = %run_id,
            gold = %input.gold_path.display(),
            labels = %input.labels_path.display(),
            "loading inputs"
        );

        let gold = load_gold_table(&input.gold_path, input.on_malformed)?;
        let labels = load_label_table(&input.labels_path, input.on_malformed)?;

        let mut warnings = Vec::new();
        for summary in [&gold.summary, &labels.summary] {
            if summary.rows_rejected > 0 {
                warnings.push(format!(
                    "{} malformed rows discarded from {}",
                    summary.rows_rejected, summary.path
                ));
            }
        }

        let calibration = Calibration::build(&gold.rows, &labels.rows, config)?;
        let counts = RunCounts {
            gold_items: calibration.gold.len(),
            labels: labels.rows.len(),
            labels_on_gold: calibration.labels.on_gold.len(),
            labels_unknown: calibration.labels.unknown.len(),
            worker_profiles: calibration.profiles.len(),
            ..RunCounts::default()
        };

        info!(
            gold_items = counts.gold_items,
            labels_on_gold = counts.labels_on_gold,
            labels_unknown = counts.labels_unknown,
            worker_profiles = counts.worker_profiles,
            "calibrated workers"
        );

        Ok(Self {
            run_id,
            calibration,
            inputs: vec![gold.summary, labels.summary],
            counts,
            warnings,
            on_malformed: input.on_malformed.as_str().to_string(),
        })
    }

    pub fn config_summary(&self, quantiles: Vec<f64>) -> RunConfigSummary {
        RunConfigSummary {
            smoothing: self.calibration.config.smoothing.value(),
            tie_policy: self.calibration.config.tie_policy.as_str().to_string(),
            on_malformed: self.on_malformed.clone(),
            quantiles,
        }
    }
}

/// Collects JSON artifacts for `--out-dir` and finishes with the run manifest.
pub(super) struct ArtifactWriter {
    out_dir: Option<PathBuf>,
    written: Vec<String>,
}

impl ArtifactWriter {
    pub fn new(out_dir: Option<&Path>) -> Self {
        Self {
            out_dir: out_dir.map(Path::to_path_buf),
            written: Vec::new(),
        }
    }

    pub fn write<T: Serialize>(&mut self, file_name: &str, value: &T) -> Result<()> {
        let Some(out_dir) = &self.out_dir else {
            return Ok(());
        };
        let path = out_dir.join(file_name);
        write_json_pretty(&path, value)?;
        info!(path = %path.display(), "wrote artifact");
        self.written.push(file_name.to_string());
        Ok(())
    }

    pub fn finish(self, session: Session, command: &str, config: RunConfigSummary) -> Result<()> {
        let Some(out_dir) = &self.out_dir else {
            return Ok(());
        };

        let manifest = RunManifest {
            manifest_version: MANIFEST_VERSION,
            run_id: session.run_id.clone(),
            generated_at: now_utc_string(),
            command: command.to_string(),
            config,
            inputs: session.inputs,
            counts: session.counts,
            artifacts: self.written,
            warnings: session.warnings,
        };
        let path = out_dir.join(format!("{}_manifest.json", session.run_id));
        write_json_pretty(&path, &manifest)?;
        info!(path = %path.display(), "wrote run manifest");
        Ok(())
    }
}
