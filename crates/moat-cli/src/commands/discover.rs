//! Discover command implementation.

use crate::cli::DiscoverArgs;
use crate::commands::{CliPipeline, Session};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::source::FileExtractionSource;
use moat_domain::DiscoveredCompany;
use moat_pipeline::PipelineMetrics;
use std::fs;

/// Execute the discover command.
pub fn execute_discover(args: DiscoverArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let contents = fs::read_to_string(&args.file)?;
    let records = parse_discovered(&contents)?;

    let mut pipeline = CliPipeline::new(
        session.open_store()?,
        FileExtractionSource::empty(),
        session.load_thesis()?,
        session.config.pipeline.clone(),
    )?;

    let mut metrics = PipelineMetrics::new();
    let added = pipeline.discover(&records, &mut metrics)?;

    println!(
        "{}",
        formatter.success(&format!("Discovered {} new company(s)", added))
    );
    if metrics.duplicates > 0 {
        println!(
            "{}",
            formatter.info(&format!("Skipped {} duplicate(s)", metrics.duplicates))
        );
    }
    if metrics.store_failures > 0 {
        println!(
            "{}",
            formatter.warning(&format!("{} record(s) could not be stored", metrics.store_failures))
        );
    }
    Ok(())
}

/// Parse a JSON array of discovery records, rejecting blank names.
pub fn parse_discovered(contents: &str) -> Result<Vec<DiscoveredCompany>> {
    let records: Vec<DiscoveredCompany> = serde_json::from_str(contents)?;
    if let Some(position) = records.iter().position(|r| r.name.trim().is_empty()) {
        return Err(CliError::InvalidInput(format!(
            "record {} has an empty company name",
            position
        )));
    }
    Ok(records)
}
