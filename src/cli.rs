use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::aggregation::DEFAULT_SMOOTHING;

#[derive(Parser, Debug)]
#[command(
    name = "crowdlabel",
    version,
    about = "Gold-calibrated aggregation of crowd-sourced item ratings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every worker against the gold set.
    Profile(ProfileArgs),
    /// Predict categories for unrated items under one reliability quantile.
    Predict(PredictArgs),
    /// Cross-tabulate predictions made under two reliability quantiles.
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Tab-separated `item<TAB>category` rows.
    #[arg(long, default_value = "gold.txt")]
    pub gold_path: PathBuf,

    /// Tab-separated `worker<TAB>item<TAB>category` rows.
    #[arg(long, default_value = "labels.txt")]
    pub labels_path: PathBuf,

    #[arg(long, value_enum, default_value_t = MalformedRowPolicy::Discard)]
    pub on_malformed: MalformedRowPolicy,

    /// The K in accuracy / (K - accuracy); must exceed 1.
    #[arg(long, default_value_t = DEFAULT_SMOOTHING)]
    pub smoothing: f64,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write output tables and a run manifest as JSON files into this directory.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Rows shown per table in text mode.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, default_value_t = 20)]
    pub min_gold_ratings: u32,

    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, default_value_t = 0.75)]
    pub quantile: f64,

    #[arg(long, value_enum, default_value_t = TiePolicy::KeepAll)]
    pub tie_policy: TiePolicy,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, default_value_t = 0.75)]
    pub strict_quantile: f64,

    #[arg(long, default_value_t = 0.25)]
    pub inclusive_quantile: f64,

    #[arg(long, value_enum, default_value_t = TiePolicy::KeepAll)]
    pub tie_policy: TiePolicy,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MalformedRowPolicy {
    Discard,
    Fail,
}

impl MalformedRowPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discard => "discard",
            Self::Fail => "fail",
        }
    }
}

/// What to do when several categories share the top Overall Odds for an item.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum TiePolicy {
    #[default]
    KeepAll,
    FirstCategory,
    Reject,
}

impl TiePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepAll => "keep-all",
            Self::FirstCategory => "first-category",
            Self::Reject => "reject",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_defaults_match_reference_quantiles() {
        let cli = Cli::try_parse_from(["crowdlabel", "compare"]).expect("defaults parse");
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare subcommand");
        };
        assert_eq!(args.strict_quantile, 0.75);
        assert_eq!(args.inclusive_quantile, 0.25);
        assert_eq!(args.tie_policy, TiePolicy::KeepAll);
        assert_eq!(args.input.smoothing, DEFAULT_SMOOTHING);
        assert_eq!(args.input.on_malformed, MalformedRowPolicy::Discard);
    }

    #[test]
    fn predict_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "crowdlabel",
            "predict",
            "--gold-path",
            "data/gold.tsv",
            "--quantile",
            "0.5",
            "--smoothing",
            "1.01",
            "--tie-policy",
            "first-category",
            "--on-malformed",
            "fail",
            "--json",
        ])
        .expect("overrides parse");
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict subcommand");
        };
        assert_eq!(args.input.gold_path, PathBuf::from("data/gold.tsv"));
        assert_eq!(args.quantile, 0.5);
        assert_eq!(args.input.smoothing, 1.01);
        assert_eq!(args.tie_policy, TiePolicy::FirstCategory);
        assert_eq!(args.input.on_malformed, MalformedRowPolicy::Fail);
        assert!(args.output.json);
    }
}
