use super::*;

/// Ground truth keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct GoldSet {
    truth: BTreeMap<String, Category>,
}

impl GoldSet {
    pub fn from_items(items: &[GoldItem]) -> Result<Self> {
        let mut truth = BTreeMap::<String, Category>::new();
        for item in items {
            match truth.get(&item.item_id) {
                Some(existing) if *existing != item.true_category => bail!(
                    "gold item {} has conflicting categories {} and {}",
                    item.item_id,
                    existing,
                    item.true_category
                ),
                Some(_) => {}
                None => {
                    truth.insert(item.item_id.clone(), item.true_category);
                }
            }
        }
        Ok(Self { truth })
    }

    pub fn truth_for(&self, item_id: &str) -> Option<Category> {
        self.truth.get(item_id).copied()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.truth.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.truth.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedLabels {
    pub on_gold: Vec<Label>,
    pub unknown: Vec<Label>,
}

impl PartitionedLabels {
    pub fn split(labels: &[Label], gold: &GoldSet) -> Self {
        let (on_gold, unknown): (Vec<Label>, Vec<Label>) = labels
            .iter()
            .cloned()
            .partition(|label| gold.contains(&label.item_id));
        Self { on_gold, unknown }
    }
}

/// WorkerProfiles keyed by worker id. Only workers with at least one gold
/// rating are ever inserted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerTable {
    profiles: BTreeMap<String, WorkerProfile>,
}

impl WorkerTable {
    pub fn get(&self, worker_id: &str) -> Option<&WorkerProfile> {
        self.profiles.get(worker_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn to_vec(&self) -> Vec<WorkerProfile> {
        self.profiles.values().cloned().collect()
    }
}

impl FromIterator<WorkerProfile> for WorkerTable {
    fn from_iter<I: IntoIterator<Item = WorkerProfile>>(iter: I) -> Self {
        let profiles = iter
            .into_iter()
            .map(|profile| (profile.worker_id.clone(), profile))
            .collect();
        Self { profiles }
    }
}

/// Workers whose gold labels never matched have no entry in the match tally.
/// Their correct count is zero, never undefined.
fn correct_count_or_zero(matched: Option<u32>) -> u32 {
    matched.unwrap_or(0)
}

/// Builds a WorkerProfile for every worker with at least one label on a gold
/// item. Labels on items outside the gold set are ignored.
pub fn estimate_worker_profiles(
    on_gold: &[Label],
    gold: &GoldSet,
    smoothing: SmoothingConstant,
) -> WorkerTable {
    let mut ratings = BTreeMap::<&str, u32>::new();
    let mut matches = BTreeMap::<&str, u32>::new();

    for label in on_gold {
        let Some(truth) = gold.truth_for(&label.item_id) else {
            continue;
        };
        *ratings.entry(label.worker_id.as_str()).or_default() += 1;
        if label.category == truth {
            *matches.entry(label.worker_id.as_str()).or_default() += 1;
        }
    }

    ratings
        .into_iter()
        .map(|(worker_id, gold_ratings_count)| {
            let gold_correct_count = correct_count_or_zero(matches.get(worker_id).copied());
            let accuracy = accuracy_from_counts(gold_correct_count, gold_ratings_count);
            WorkerProfile {
                worker_id: worker_id.to_string(),
                gold_ratings_count,
                gold_correct_count,
                accuracy,
                odds: accuracy_to_odds(accuracy, smoothing),
            }
        })
        .collect()
}
