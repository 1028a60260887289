use super::*;

/// Everything derived from the gold set, shared by every threshold run.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub gold: GoldSet,
    pub labels: PartitionedLabels,
    pub profiles: WorkerTable,
    pub config: AggregationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdRun {
    pub quantile: f64,
    pub cutoff: VolumeCutoff,
    pub reliable_workers: usize,
    pub evidence: Vec<CategoryEvidence>,
    pub predictions: Vec<ItemPrediction>,
}

impl ThresholdRun {
    pub fn predicted_items(&self) -> usize {
        self.predictions
            .iter()
            .map(|prediction| prediction.item_id.as_str())
            .collect::<BTreeSet<&str>>()
            .len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityReport {
    pub strict: ThresholdRun,
    pub inclusive: ThresholdRun,
    pub matrix: ComparisonMatrix,
}

impl Calibration {
    pub fn build(
        gold_items: &[GoldItem],
        labels: &[Label],
        config: AggregationConfig,
    ) -> Result<Self> {
        if gold_items.is_empty() {
            bail!("gold table is empty; worker accuracy cannot be calibrated");
        }
        if labels.is_empty() {
            bail!("label table is empty; nothing to aggregate");
        }

        let gold = GoldSet::from_items(gold_items)?;
        let labels = PartitionedLabels::split(labels, &gold);
        let profiles = estimate_worker_profiles(&labels.on_gold, &gold, config.smoothing);
        if profiles.is_empty() {
            bail!(
                "none of the {} labels touches one of the {} gold items; no worker can be profiled",
                labels.unknown.len(),
                gold.len()
            );
        }

        debug!(
            gold_items = gold.len(),
            labels_on_gold = labels.on_gold.len(),
            labels_unknown = labels.unknown.len(),
            worker_profiles = profiles.len(),
            "calibrated workers against gold"
        );

        Ok(Self {
            gold,
            labels,
            profiles,
            config,
        })
    }

    /// Reliability filter followed by evidence aggregation for one quantile.
    /// The cutoff is recomputed from the profiles on every call.
    pub fn run_threshold(&self, quantile: Quantile) -> Result<ThresholdRun> {
        let cutoff = reliability_threshold(&self.profiles, quantile)
            .context("no worker profiles to derive a reliability cutoff from")?;
        let reliable = reliable_workers(&self.profiles, cutoff);
        let evidence = overall_odds(&self.labels.unknown, &self.profiles, &reliable);
        let predictions = select_top_categories(&evidence, self.config.tie_policy)
            .with_context(|| format!("aggregation failed at quantile {}", quantile.value()))?;

        debug!(
            quantile = quantile.value(),
            cutoff = ?cutoff,
            reliable_workers = reliable.len(),
            predictions = predictions.len(),
            "threshold run complete"
        );

        Ok(ThresholdRun {
            quantile: quantile.value(),
            cutoff,
            reliable_workers: reliable.len(),
            evidence,
            predictions,
        })
    }

    pub fn compare_thresholds(
        &self,
        strict: Quantile,
        inclusive: Quantile,
    ) -> Result<SensitivityReport> {
        let strict = self.run_threshold(strict)?;
        let inclusive = self.run_threshold(inclusive)?;
        let matrix = compare_predictions(&strict.predictions, &inclusive.predictions);
        Ok(SensitivityReport {
            strict,
            inclusive,
            matrix,
        })
    }
}
