use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};

use crate::aggregation::{Quantile, SensitivityReport};
use crate::cli::CompareArgs;
use crate::util::quantile_tag;

use super::output::{format_optional, write_json_stdout, write_matrix, write_threshold_run};
use super::session::{ArtifactWriter, Session};

pub fn run(args: CompareArgs) -> Result<()> {
    let strict = Quantile::new(args.strict_quantile)?;
    let inclusive = Quantile::new(args.inclusive_quantile)?;
    if strict.value() < inclusive.value() {
        warn!(
            strict = strict.value(),
            inclusive = inclusive.value(),
            "strict quantile is below the inclusive quantile"
        );
    }

    let mut session = Session::open(&args.input, args.tie_policy)?;
    let report = session.calibration.compare_thresholds(strict, inclusive)?;

    session.counts.reliable_workers = vec![
        report.strict.reliable_workers,
        report.inclusive.reliable_workers,
    ];
    session.counts.predicted_items = vec![
        report.strict.predicted_items(),
        report.inclusive.predicted_items(),
    ];
    session.counts.compared_pairs = Some(report.matrix.total());

    info!(
        compared = report.matrix.total(),
        agreement = %format_optional(report.matrix.agreement_rate()),
        "compared reliability thresholds"
    );

    if args.output.json {
        write_json_stdout(&report)?;
    } else {
        write_text(&report, args.output.limit)?;
    }

    let strict_tag = quantile_tag(report.strict.quantile);
    let inclusive_tag = quantile_tag(report.inclusive.quantile);
    let mut artifacts = ArtifactWriter::new(args.output.out_dir.as_deref());
    artifacts.write("worker_profiles.json", &session.calibration.profiles.to_vec())?;
    artifacts.write(
        &format!("predictions_strict_{strict_tag}.json"),
        &report.strict.predictions,
    )?;
    artifacts.write(
        &format!("predictions_inclusive_{inclusive_tag}.json"),
        &report.inclusive.predictions,
    )?;
    artifacts.write(
        &format!("comparison_strict_{strict_tag}_vs_inclusive_{inclusive_tag}.json"),
        &report.matrix,
    )?;
    let config = session.config_summary(vec![report.strict.quantile, report.inclusive.quantile]);
    artifacts.finish(session, "compare", config)
}

fn write_text(report: &SensitivityReport, limit: usize) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    write_threshold_run(&mut output, &report.strict, limit)?;
    writeln!(output)?;
    write_threshold_run(&mut output, &report.inclusive, limit)?;
    writeln!(output)?;
    write_matrix(
        &mut output,
        &report.matrix,
        &format!("strict {}", quantile_tag(report.strict.quantile)),
        &format!("inclusive {}", quantile_tag(report.inclusive.quantile)),
    )?;

    output.flush()?;
    Ok(())
}
