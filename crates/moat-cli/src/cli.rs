//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use moat_domain::Tier;
use std::path::PathBuf;

/// Moat - thesis-driven moat scoring for company pipelines.
#[derive(Debug, Parser)]
#[command(name = "moat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.moat/config.toml)
    #[arg(short, long, global = true, env = "MOAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path, overriding the configuration
    #[arg(long, global = true, env = "MOAT_DB")]
    pub db: Option<PathBuf>,

    /// Thesis file, overriding the configuration
    #[arg(long, global = true, env = "MOAT_THESIS")]
    pub thesis: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import discovered companies from a JSON file
    Discover(DiscoverArgs),

    /// Run extraction, enrichment and scoring
    Run(RunArgs),

    /// List scored companies
    Scores(ScoresArgs),

    /// Tier changes recorded in the audit log
    Report(ReportArgs),

    /// Inspect or validate a thesis
    Thesis(ThesisArgs),
}

/// Arguments for the discover command.
#[derive(Debug, Parser)]
pub struct DiscoverArgs {
    /// JSON array of discovered companies
    pub file: PathBuf,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// JSON file of registry and website facts keyed by company name
    #[arg(long)]
    pub facts: Option<PathBuf>,

    /// Re-run every stage regardless of completion markers
    #[arg(long)]
    pub force: bool,

    /// Skip the LLM stages
    #[arg(long)]
    pub no_llm: bool,

    /// Configuration preset replacing the pipeline section of the config
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,

    /// Write the tier change report (markdown) to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Pipeline configuration presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Preset {
    /// Weekly re-extraction
    Default,
    /// Daily re-extraction, single-company LLM batches
    Aggressive,
    /// Monthly re-extraction, long LLM inputs
    Lenient,
}

/// Arguments for the scores command.
#[derive(Debug, Parser)]
pub struct ScoresArgs {
    /// Only show this tier
    #[arg(short, long, value_enum)]
    pub tier: Option<TierArg>,

    /// Include companies without a score
    #[arg(long)]
    pub all: bool,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the report command.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Only consider scoring events at or after this timestamp (seconds)
    #[arg(long, default_value = "0")]
    pub since: u64,
}

/// Arguments for the thesis command.
#[derive(Debug, Parser)]
pub struct ThesisArgs {
    /// Thesis subcommand
    #[command(subcommand)]
    pub command: ThesisCommand,
}

/// Thesis subcommands.
#[derive(Debug, Subcommand)]
pub enum ThesisCommand {
    /// Validate a thesis file
    Check {
        /// Thesis TOML file (default: the configured thesis)
        path: Option<PathBuf>,
    },
    /// Print the configured thesis pillars and tiers
    Show,
}

/// Tier argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TierArg {
    /// Waitlist tier
    Waitlist,
    /// Standard tier
    Standard,
    /// Strong tier
    Strong,
    /// Top tier
    Top,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Waitlist => Tier::Waitlist,
            TierArg::Standard => Tier::Standard,
            TierArg::Strong => Tier::Strong,
            TierArg::Top => Tier::Top,
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["moat", "run", "--force", "--preset", "aggressive"]).unwrap();
        match cli.command {
            Command::Run(args) => {
                assert!(args.force);
                assert!(matches!(args.preset, Some(Preset::Aggressive)));
                assert!(!args.no_llm);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_thesis_check() {
        let cli = Cli::try_parse_from(["moat", "thesis", "check", "custom.toml"]).unwrap();
        match cli.command {
            Command::Thesis(ThesisArgs {
                command: ThesisCommand::Check { path },
            }) => assert_eq!(path, Some(PathBuf::from("custom.toml"))),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_scores_filters() {
        let cli = Cli::try_parse_from(["moat", "--format", "json", "scores", "--tier", "top", "-l", "5"]).unwrap();
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Scores(args) => {
                assert_eq!(Tier::from(args.tier.unwrap()), Tier::Top);
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["moat"]).is_err());
    }
}
