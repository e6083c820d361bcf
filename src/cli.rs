use std::path::PathBuf;

mod build;
mod check;
mod parse;
mod preen;
mod terminal;

use build::Build;
use check::Check;
use clap::ArgAction;
use parse::Parse;
use preen::Preen;
use reqmodel::{Config, Key, Qualifier, domain::OutputFormat};
use serde_json::{Value, json};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the configuration file (ignored if it does not exist)
    #[arg(short, long, default_value = "reqkey.toml", global = true)]
    config: PathBuf,

    /// Output format, overriding the configured one
    #[arg(long, value_name = "FORMAT", global = true)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let mut config = Config::load_or_default(&self.config).map_err(|e| anyhow::anyhow!(e))?;
        tracing::debug!(path = %self.config.display(), ?config, "loaded configuration");
        if let Some(output) = self.output {
            config.output = output;
        }

        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Parse stored keys and show their structure
    Parse(Parse),

    /// Print the canonical form of keys or local names
    Preen(Preen),

    /// Build a new key under a parent key
    Build(Build),

    /// Audit a list of stored keys for invalid entries and collisions
    ///
    /// Two entries collide when they preen to the same canonical key, and so
    /// would address the same row.
    Check(Check),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Parse(command) => command.run(config.output)?,
            Self::Preen(command) => command.run(config.output)?,
            Self::Build(command) => command.run(config.output)?,
            Self::Check(command) => command.run(config)?,
        }
        Ok(())
    }
}

/// The JSON description of a key shared by the `parse` and `build` commands.
fn key_json(key: &Key) -> Value {
    let segments: Vec<_> = key
        .segments()
        .map(|segment| {
            json!({
                "kind": segment.kind().label(),
                "qualifier": segment.qualifier().map(Qualifier::label),
                "name": segment.name().as_str(),
            })
        })
        .collect();

    json!({
        "key": key.as_str(),
        "kind": key.kind().label(),
        "name": key.local_name(),
        "qualifier": key.qualifier().map(Qualifier::label),
        "parent": key.parent().map(String::from),
        "segments": segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_json_describes_chain() {
        let key: Key = "domain/d/subdomain/s/class/c/state/st/saction/exit/leave"
            .parse()
            .unwrap();

        let value = key_json(&key);

        assert_eq!(value["kind"], "saction");
        assert_eq!(value["qualifier"], "exit");
        assert_eq!(value["name"], "leave");
        assert_eq!(value["parent"], "domain/d/subdomain/s/class/c/state/st");
        assert_eq!(value["segments"].as_array().unwrap().len(), 5);
        assert_eq!(value["segments"][0]["qualifier"], Value::Null);
    }
}
