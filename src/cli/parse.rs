use std::process;

use clap::Parser;
use reqmodel::{Key, domain::OutputFormat};
use serde_json::json;
use tracing::instrument;

use super::terminal::{Colorize, highlight};

#[derive(Debug, Parser)]
#[command(about = "Parse stored keys and show their kind, name and ancestry")]
pub struct Parse {
    /// The keys to parse, e.g. 'domain/shop/subdomain/orders'
    #[arg(required = true)]
    keys: Vec<String>,
}

impl Parse {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, output: OutputFormat) -> anyhow::Result<()> {
        let results: Vec<_> = self
            .keys
            .iter()
            .map(|raw| (raw, Key::parse(raw)))
            .collect();
        let failures = results.iter().filter(|(_, result)| result.is_err()).count();

        match output {
            OutputFormat::Json => {
                let entries: Vec<_> = results
                    .iter()
                    .map(|(raw, result)| match result {
                        Ok(key) => json!({ "input": raw, "parsed": super::key_json(key) }),
                        Err(e) => json!({ "input": raw, "error": e.to_string() }),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                for (raw, result) in &results {
                    match result {
                        Ok(key) => println!("{}", describe(key)),
                        Err(e) => eprintln!("{} {raw}: {e}", "error:".failure()),
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

/// A multi-line text description of a key.
fn describe(key: &Key) -> String {
    let mut lines = vec![highlight(key)];
    lines.push(format!("  {} {}", "kind:  ".dim(), key.kind()));
    lines.push(format!("  {} {}", "name:  ".dim(), key.local_name()));
    if let Some(qualifier) = key.qualifier() {
        lines.push(format!("  {} {qualifier}", "when:  ".dim()));
    }
    for ancestor in key.ancestors() {
        lines.push(format!("  {} {ancestor}", format!("{}:", ancestor.kind()).dim()));
    }
    lines.join("\n")
}
