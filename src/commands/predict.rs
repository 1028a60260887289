use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::aggregation::{Quantile, ThresholdRun};
use crate::cli::PredictArgs;
use crate::util::quantile_tag;

use super::output::{write_json_stdout, write_strongest_evidence, write_threshold_run};
use super::session::{ArtifactWriter, Session};

pub fn run(args: PredictArgs) -> Result<()> {
    let quantile = Quantile::new(args.quantile)?;
    let mut session = Session::open(&args.input, args.tie_policy)?;

    let run = session.calibration.run_threshold(quantile)?;
    session.counts.reliable_workers = vec![run.reliable_workers];
    session.counts.predicted_items = vec![run.predicted_items()];

    info!(
        quantile = run.quantile,
        reliable_workers = run.reliable_workers,
        predicted_items = run.predicted_items(),
        "predicted categories"
    );

    if args.output.json {
        write_json_stdout(&run)?;
    } else {
        write_text(&run, args.output.limit)?;
    }

    let mut artifacts = ArtifactWriter::new(args.output.out_dir.as_deref());
    artifacts.write("worker_profiles.json", &session.calibration.profiles.to_vec())?;
    artifacts.write(
        &format!("predictions_{}.json", quantile_tag(run.quantile)),
        &run.predictions,
    )?;
    let config = session.config_summary(vec![run.quantile]);
    artifacts.finish(session, "predict", config)
}

fn write_text(run: &ThresholdRun, limit: usize) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    write_threshold_run(&mut output, run, limit)?;
    writeln!(output)?;
    write_strongest_evidence(&mut output, &run.evidence, limit)?;

    output.flush()?;
    Ok(())
}
