use super::*;

/// Inner-joins two prediction tables on item id and counts every joined
/// (strict category, inclusive category) pair. Items predicted under only one
/// threshold do not contribute.
pub fn compare_predictions(
    strict: &[ItemPrediction],
    inclusive: &[ItemPrediction],
) -> ComparisonMatrix {
    let mut inclusive_by_item = BTreeMap::<&str, Vec<Category>>::new();
    for prediction in inclusive {
        inclusive_by_item
            .entry(prediction.item_id.as_str())
            .or_default()
            .push(prediction.top_category);
    }

    let mut matrix = ComparisonMatrix::empty();
    for prediction in strict {
        let Some(categories) = inclusive_by_item.get(prediction.item_id.as_str()) else {
            continue;
        };
        for category in categories {
            matrix.record(prediction.top_category, *category);
        }
    }
    matrix
}
