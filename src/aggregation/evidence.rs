use super::*;

/// Overall Odds for one (item, category) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEvidence {
    pub item_id: String,
    pub category: Category,
    pub overall_odds: f64,
    /// Sum of `ln(odds)` over the votes; `-inf` once any vote has zero odds.
    /// Ranking uses this score so long products that overflow to `inf` still
    /// order correctly.
    pub log_odds: f64,
    pub votes: usize,
}

/// Reduces the contributing odds to (product, sum of logs). Factors are taken
/// in ascending order so both results do not depend on vote order.
fn combine_odds(mut factors: Vec<f64>) -> (f64, f64) {
    factors.sort_by(|left, right| left.total_cmp(right));
    let product: f64 = factors.iter().product();
    let log_sum: f64 = factors.iter().map(|odds| odds.ln()).sum();
    (product, log_sum)
}

/// Groups reliable votes on unknown items by (item, category) and reduces each
/// group to its Overall Odds. Items without a reliable vote are absent.
pub fn overall_odds(
    unknown: &[Label],
    profiles: &WorkerTable,
    reliable: &BTreeSet<String>,
) -> Vec<CategoryEvidence> {
    let mut groups = BTreeMap::<(&str, Category), Vec<f64>>::new();

    for label in unknown {
        if !reliable.contains(&label.worker_id) {
            continue;
        }
        let Some(profile) = profiles.get(&label.worker_id) else {
            continue;
        };
        groups
            .entry((label.item_id.as_str(), label.category))
            .or_default()
            .push(profile.odds);
    }

    groups
        .into_iter()
        .map(|((item_id, category), factors)| {
            let votes = factors.len();
            let (overall_odds, log_odds) = combine_odds(factors);
            CategoryEvidence {
                item_id: item_id.to_string(),
                category,
                overall_odds,
                log_odds,
                votes,
            }
        })
        .collect()
}

/// Picks the category with the highest Overall Odds per item, compared in log
/// space, resolving exact ties according to `tie_policy`. Output is ordered by
/// item id, then category.
pub fn select_top_categories(
    evidence: &[CategoryEvidence],
    tie_policy: TiePolicy,
) -> Result<Vec<ItemPrediction>> {
    let mut by_item = BTreeMap::<&str, Vec<&CategoryEvidence>>::new();
    for row in evidence {
        by_item.entry(row.item_id.as_str()).or_default().push(row);
    }

    let mut predictions = Vec::with_capacity(by_item.len());
    let mut tied_items = 0_usize;
    for (item_id, mut rows) in by_item {
        rows.sort_by_key(|row| row.category);
        let top_log_odds = rows
            .iter()
            .map(|row| row.log_odds)
            .fold(f64::NEG_INFINITY, f64::max);
        let leaders = rows
            .into_iter()
            .filter(|row| row.log_odds == top_log_odds)
            .collect::<Vec<&CategoryEvidence>>();

        if leaders.len() > 1 {
            tied_items += 1;
        }

        let kept = match tie_policy {
            TiePolicy::KeepAll => leaders.as_slice(),
            TiePolicy::FirstCategory => &leaders[..1],
            TiePolicy::Reject if leaders.len() > 1 => {
                let categories = leaders
                    .iter()
                    .map(|row| row.category.as_str())
                    .collect::<Vec<&str>>()
                    .join(",");
                bail!(
                    "item {item_id} has tied top categories ({categories}) \
                     at log odds {top_log_odds}"
                );
            }
            TiePolicy::Reject => leaders.as_slice(),
        };

        predictions.extend(kept.iter().map(|row| ItemPrediction {
            item_id: item_id.to_string(),
            top_category: row.category,
            top_odds: row.overall_odds,
            top_log_odds: row.log_odds,
        }));
    }

    debug!(
        items = predictions.len(),
        tied_items,
        tie_policy = tie_policy.as_str(),
        "selected top categories"
    );
    Ok(predictions)
}
