use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::aggregation::{CategoryEvidence, ThresholdRun, VolumeCutoff};
use crate::model::{Category, ComparisonMatrix, WorkerProfile};

pub(super) fn write_json_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub(super) fn format_cutoff(cutoff: VolumeCutoff) -> String {
    match cutoff {
        VolumeCutoff::Unbounded => "none (every profiled worker)".to_string(),
        VolumeCutoff::Above(value) => format!("> {value:.2} gold ratings"),
        VolumeCutoff::AtMaximum(maximum) => format!("= {maximum} gold ratings (maximum)"),
    }
}

pub(super) fn format_optional(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.4}"))
        .unwrap_or_else(|| "n/a".to_string())
}

pub(super) fn write_profile_rows(
    output: &mut impl Write,
    title: &str,
    profiles: &[WorkerProfile],
    limit: usize,
) -> Result<()> {
    writeln!(output, "{title} ({} total)", profiles.len())?;
    writeln!(output, "worker\tgold_ratings\tgold_correct\taccuracy\todds")?;
    for profile in profiles.iter().take(limit) {
        writeln!(
            output,
            "{}\t{}\t{}\t{:.4}\t{:.4}",
            profile.worker_id,
            profile.gold_ratings_count,
            profile.gold_correct_count,
            profile.accuracy,
            profile.odds
        )?;
    }
    write_truncation_note(output, profiles.len(), limit)
}

pub(super) fn write_threshold_run(
    output: &mut impl Write,
    run: &ThresholdRun,
    limit: usize,
) -> Result<()> {
    writeln!(
        output,
        "Quantile {:.2}: cutoff {} reliable_workers={} predicted_items={} prediction_rows={}",
        run.quantile,
        format_cutoff(run.cutoff),
        run.reliable_workers,
        run.predicted_items(),
        run.predictions.len()
    )?;
    writeln!(output, "item\ttop_category\ttop_odds\tlog_odds")?;
    for prediction in run.predictions.iter().take(limit) {
        writeln!(
            output,
            "{}\t{}\t{:.4}\t{:.4}",
            prediction.item_id,
            prediction.top_category,
            prediction.top_odds,
            prediction.top_log_odds
        )?;
    }
    write_truncation_note(output, run.predictions.len(), limit)
}

pub(super) fn write_strongest_evidence(
    output: &mut impl Write,
    evidence: &[CategoryEvidence],
    limit: usize,
) -> Result<()> {
    let mut ranked = evidence.iter().collect::<Vec<&CategoryEvidence>>();
    ranked.sort_by(|left, right| {
        right
            .log_odds
            .total_cmp(&left.log_odds)
            .then_with(|| left.item_id.cmp(&right.item_id))
            .then_with(|| left.category.cmp(&right.category))
    });

    writeln!(output, "Strongest evidence ({} item/category pairs)", evidence.len())?;
    writeln!(output, "item\tcategory\tvotes\toverall_odds\tlog_odds")?;
    for row in ranked.into_iter().take(limit) {
        writeln!(
            output,
            "{}\t{}\t{}\t{:.4}\t{:.4}",
            row.item_id, row.category, row.votes, row.overall_odds, row.log_odds
        )?;
    }
    Ok(())
}

pub(super) fn write_matrix(
    output: &mut impl Write,
    matrix: &ComparisonMatrix,
    row_label: &str,
    column_label: &str,
) -> Result<()> {
    writeln!(output, "rows: {row_label} / columns: {column_label}")?;

    let header = Category::ALL
        .iter()
        .map(|category| category.as_str())
        .collect::<Vec<&str>>()
        .join("\t");
    writeln!(output, "\t{header}\ttotal")?;

    for row in Category::ALL {
        let cells = Category::ALL
            .iter()
            .map(|column| matrix.cell(row, *column).to_string())
            .collect::<Vec<String>>()
            .join("\t");
        writeln!(output, "{row}\t{cells}\t{}", matrix.row_total(row))?;
    }

    let column_totals = Category::ALL
        .iter()
        .map(|column| matrix.column_total(*column).to_string())
        .collect::<Vec<String>>()
        .join("\t");
    writeln!(output, "total\t{column_totals}\t{}", matrix.total())?;
    writeln!(
        output,
        "agreement: {} of {} joined predictions ({})",
        matrix.diagonal_total(),
        matrix.total(),
        format_optional(matrix.agreement_rate())
    )?;
    Ok(())
}

fn write_truncation_note(output: &mut impl Write, total: usize, limit: usize) -> Result<()> {
    if total > limit {
        writeln!(output, "... {} more rows (raise --limit to show)", total - limit)?;
    }
    Ok(())
}
