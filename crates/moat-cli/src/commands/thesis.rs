//! Thesis command implementation.

use crate::cli::{ThesisArgs, ThesisCommand};
use crate::commands::Session;
use crate::error::Result;
use crate::output::Formatter;
use moat_thesis::ThesisConfig;

/// Execute the thesis command.
pub fn execute_thesis(args: ThesisArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    match args.command {
        ThesisCommand::Check { path } => {
            let thesis = match path {
                Some(path) => ThesisConfig::load(&path)?,
                None => session.load_thesis()?.as_ref().clone(),
            };
            println!(
                "{}",
                formatter.success(&format!(
                    "Thesis '{}' v{} is valid ({} pillars, {} certifications)",
                    thesis.name,
                    thesis.version,
                    thesis.pillars.len(),
                    thesis.certifications.len()
                ))
            );
        }
        ThesisCommand::Show => {
            let thesis = session.load_thesis()?;
            println!("{}", formatter.format_thesis(&thesis)?);
        }
    }
    Ok(())
}
