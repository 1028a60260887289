use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::{ProfileArgs, TiePolicy};
use crate::model::{RunCounts, WorkerProfile};
use crate::stats::{most_accurate_workers, profiles_by_volume, volume_accuracy_correlation};

use super::output::{format_optional, write_json_stdout, write_profile_rows};
use super::session::{ArtifactWriter, Session};

#[derive(Debug, Clone, Serialize)]
struct ProfileReport {
    run_id: String,
    counts: RunCounts,
    min_gold_ratings: u32,
    volume_accuracy_correlation: Option<f64>,
    most_accurate: Vec<WorkerProfile>,
    worker_profiles: Vec<WorkerProfile>,
}

pub fn run(args: ProfileArgs) -> Result<()> {
    let session = Session::open(&args.input, TiePolicy::default())?;
    let profiles = &session.calibration.profiles;

    let report = ProfileReport {
        run_id: session.run_id.clone(),
        counts: session.counts.clone(),
        min_gold_ratings: args.min_gold_ratings,
        volume_accuracy_correlation: volume_accuracy_correlation(profiles),
        most_accurate: most_accurate_workers(profiles, args.min_gold_ratings, args.top),
        worker_profiles: profiles_by_volume(profiles),
    };

    info!(
        worker_profiles = report.worker_profiles.len(),
        eligible_top = report.most_accurate.len(),
        "profiled workers"
    );

    if args.output.json {
        write_json_stdout(&report)?;
    } else {
        write_text(&report, args.output.limit)?;
    }

    let mut artifacts = ArtifactWriter::new(args.output.out_dir.as_deref());
    artifacts.write("worker_profiles.json", &report.worker_profiles)?;
    artifacts.write("most_accurate_workers.json", &report.most_accurate)?;
    let config = session.config_summary(Vec::new());
    artifacts.finish(session, "profile", config)
}

fn write_text(report: &ProfileReport, limit: usize) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(
        output,
        "Run {}: gold_items={} labels={} on_gold={} unknown={}",
        report.run_id,
        report.counts.gold_items,
        report.counts.labels,
        report.counts.labels_on_gold,
        report.counts.labels_unknown
    )?;
    writeln!(output)?;
    write_profile_rows(&mut output, "Worker profiles", &report.worker_profiles, limit)?;
    writeln!(output)?;
    write_profile_rows(
        &mut output,
        &format!(
            "Most accurate workers with >= {} gold ratings",
            report.min_gold_ratings
        ),
        &report.most_accurate,
        limit,
    )?;
    writeln!(output)?;
    writeln!(
        output,
        "Correlation(gold ratings, accuracy): {}",
        format_optional(report.volume_accuracy_correlation)
    )?;

    output.flush()?;
    Ok(())
}
