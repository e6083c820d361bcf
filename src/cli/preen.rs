use std::process;

use clap::Parser;
use reqmodel::{domain::OutputFormat, preen, preen_key};
use serde_json::json;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Print the canonical form of keys or local names")]
pub struct Preen {
    /// The raw values to canonicalize
    #[arg(required = true)]
    values: Vec<String>,

    /// Treat the values as local names rather than whole keys
    #[arg(long)]
    name: bool,
}

impl Preen {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, output: OutputFormat) -> anyhow::Result<()> {
        let results: Vec<(&String, Result<String, String>)> = self
            .values
            .iter()
            .map(|raw| {
                let preened = if self.name {
                    preen(raw).map_err(|e| e.to_string())
                } else {
                    preen_key(raw).map_err(|e| e.to_string())
                };
                (raw, preened)
            })
            .collect();
        let failures = results.iter().filter(|(_, result)| result.is_err()).count();

        match output {
            OutputFormat::Json => {
                let entries: Vec<_> = results
                    .iter()
                    .map(|(raw, result)| match result {
                        Ok(canonical) => json!({ "input": raw, "canonical": canonical }),
                        Err(e) => json!({ "input": raw, "error": e }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                for (raw, result) in &results {
                    match result {
                        Ok(canonical) => println!("{canonical}"),
                        Err(e) => eprintln!("{} {raw:?}: {e}", "error:".failure()),
                    }
                }
            }
        }

        if failures > 0 {
            process::exit(1);
        }
        Ok(())
    }
}
