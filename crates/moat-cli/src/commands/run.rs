//! Run command implementation.

use crate::cli::{Preset, RunArgs};
use crate::commands::{CliPipeline, Session};
use crate::error::Result;
use crate::output::Formatter;
use crate::source::FileExtractionSource;
use moat_llm::OllamaProvider;
use moat_pipeline::PipelineConfig;
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Execute the run command.
///
/// The LLM client blocks, so the pipeline is built and dropped outside the
/// runtime; only the run itself is driven by `block_on`.
pub fn execute_run(args: RunArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let config = pipeline_config(&args, &session.config.pipeline);
    let source = match &args.facts {
        Some(path) => FileExtractionSource::load(path)?,
        None => FileExtractionSource::empty(),
    };

    let mut pipeline = CliPipeline::new(session.open_store()?, source, session.load_thesis()?, config)?;

    let llm = &session.config.llm;
    if session.config.llm_enabled() && !args.no_llm {
        info!("Using {} model '{}' at {}", llm.provider, llm.model, llm.endpoint);
        let provider = OllamaProvider::new(&llm.endpoint, &llm.model)?;
        pipeline = pipeline.with_llm(Arc::new(provider));
    } else {
        println!("{}", formatter.info("LLM stages disabled"));
    }

    let summary = runtime.block_on(pipeline.run())?;

    println!("{}", formatter.format_run(&summary, pipeline.costs())?);

    if let Some(path) = &args.report {
        fs::write(path, summary.report.render_markdown())?;
        println!(
            "{}",
            formatter.success(&format!("Tier change report written to {}", path.display()))
        );
    }

    let notable = summary.report.notable_changes().len();
    if notable > 0 {
        println!(
            "{}",
            formatter.success(&format!("{} notable tier change(s)", notable))
        );
    }
    Ok(())
}

/// Pipeline settings after applying the preset and `--force`.
pub fn pipeline_config(args: &RunArgs, configured: &PipelineConfig) -> PipelineConfig {
    let mut config = match args.preset {
        None => configured.clone(),
        Some(Preset::Default) => PipelineConfig::default(),
        Some(Preset::Aggressive) => PipelineConfig::aggressive(),
        Some(Preset::Lenient) => PipelineConfig::lenient(),
    };
    if args.force {
        config.force = true;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(preset: Option<Preset>, force: bool) -> RunArgs {
        RunArgs {
            facts: None,
            force,
            no_llm: true,
            preset,
            report: None,
        }
    }

    #[test]
    fn test_configured_settings_used_without_preset() {
        let configured = PipelineConfig {
            skip_window_days: 14,
            ..PipelineConfig::default()
        };
        let config = pipeline_config(&args(None, false), &configured);
        assert_eq!(config.skip_window_days, 14);
        assert!(!config.force);
    }

    #[test]
    fn test_preset_and_force() {
        let config = pipeline_config(&args(Some(Preset::Lenient), true), &PipelineConfig::default());
        assert_eq!(config.skip_window_days, 30);
        assert!(config.force);
    }

    #[test]
    fn test_run_scores_discovered_companies_offline() {
        use crate::cli::DiscoverArgs;
        use crate::commands::execute_discover;
        use crate::config::{Config, OutputFormat};
        use moat_domain::traits::{AuditLog, CompanyStore};

        let dir = tempfile::tempdir().unwrap();
        let discovered = dir.path().join("discovered.json");
        fs::write(
            &discovered,
            r#"[{"name": "Acme Ltd", "hq_country": "GB", "source": "cyber_essentials",
                "website": "https://acme.example"}]"#,
        )
        .unwrap();
        let facts = dir.path().join("facts.json");
        fs::write(
            &facts,
            r#"{"Acme Ltd": {"site": {
                "text": "Acme builds secure gateways for regulated industries",
                "certifications": [{"cert_type": "ISO 27001"}]
            }}}"#,
        )
        .unwrap();
        let report = dir.path().join("report.md");

        let session = Session::new(Config::default(), Some(dir.path().join("moat.db")), None).unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        execute_discover(DiscoverArgs { file: discovered }, &session, &formatter).unwrap();

        let args = RunArgs {
            facts: Some(facts),
            force: false,
            no_llm: true,
            preset: None,
            report: Some(report.clone()),
        };
        execute_run(args, &session, &formatter).unwrap();

        let store = session.open_store().unwrap();
        let companies = store.list_companies().unwrap();
        assert!(companies[0].moat_score.is_some());
        assert_eq!(store.event_count().unwrap(), 1);
        assert!(fs::read_to_string(report).unwrap().starts_with("# Tier Changes"));
    }
}
