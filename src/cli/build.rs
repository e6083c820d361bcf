use anyhow::Context;
use clap::Parser;
use reqmodel::{
    Key,
    domain::{ActionRef, OutputFormat},
};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Build a new key and print its canonical form")]
pub struct Build {
    /// The kind of key to build (domain, subdomain, class, usecase, state,
    /// action, guard or saction)
    kind: String,

    /// The local name of the new entity
    name: String,

    /// The key of the parent entity (required for every kind except domain)
    #[arg(long, short)]
    parent: Option<String>,

    /// For a state action, the key of the action it fires
    #[arg(long, requires = "qualifier")]
    action: Option<String>,

    /// For a state action, when it fires (entry, do or exit)
    #[arg(long, requires = "action")]
    qualifier: Option<String>,
}

impl Build {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, output: OutputFormat) -> anyhow::Result<()> {
        let parent = self
            .parent
            .as_deref()
            .map(Key::parse)
            .transpose()
            .context("invalid parent key")?;
        let action = self
            .action
            .as_deref()
            .map(Key::parse)
            .transpose()
            .context("invalid action key")?;

        let action_ref = match (&action, &self.qualifier) {
            (Some(action), Some(qualifier)) => Some(ActionRef { action, qualifier }),
            _ => None,
        };

        let key = Key::build_labelled(&self.kind, parent.as_ref(), &self.name, action_ref)?;
        tracing::info!(key = %key, "built key");

        match output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&super::key_json(&key))?);
            }
            OutputFormat::Text => println!("{key}"),
        }
        Ok(())
    }
}
