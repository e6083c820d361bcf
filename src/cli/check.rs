use std::{
    collections::{HashMap, hash_map::Entry},
    io,
    path::PathBuf,
    process,
};

use anyhow::Context;
use clap::Parser;
use reqmodel::{Config, Key, domain::OutputFormat};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Audit a newline-separated list of stored keys")]
pub struct Check {
    /// File listing one key per line (reads stdin if omitted)
    ///
    /// Blank lines and lines starting with '#' are ignored.
    file: Option<PathBuf>,
}

impl Check {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let content = self.read_input()?;

        let audit = Audit::of(&content);
        tracing::debug!(
            checked = audit.checked,
            invalid = audit.invalid.len(),
            collisions = audit.collisions.len(),
            "audit complete"
        );

        match config.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&audit)?),
            OutputFormat::Text => audit.print(config.allow_collisions),
        }

        let mut exit_code = 0;
        if !audit.collisions.is_empty() && !config.allow_collisions {
            exit_code = exit_code.max(2);
        }
        if !audit.invalid.is_empty() {
            exit_code = exit_code.max(1);
        }

        if exit_code != 0 {
            process::exit(exit_code);
        }
        Ok(())
    }

    fn read_input(&self) -> anyhow::Result<String> {
        let Some(path) = &self.file else {
            return io::read_to_string(io::stdin()).context("failed to read stdin");
        };
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// The findings of checking a list of keys.
#[derive(Debug, Default, Serialize)]
struct Audit {
    checked: usize,
    invalid: Vec<InvalidLine>,
    collisions: Vec<Collision>,
}

/// A line that is not a valid key.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct InvalidLine {
    line: usize,
    input: String,
    error: String,
}

/// A line addressing the same key as an earlier line.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct Collision {
    line: usize,
    first_line: usize,
    key: String,
}

impl Audit {
    fn of(content: &str) -> Self {
        let mut audit = Self::default();
        let mut seen: HashMap<Key, usize> = HashMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            audit.checked += 1;

            match Key::parse(trimmed) {
                Ok(key) => match seen.entry(key) {
                    Entry::Occupied(first) => audit.collisions.push(Collision {
                        line,
                        first_line: *first.get(),
                        key: first.key().to_string(),
                    }),
                    Entry::Vacant(slot) => {
                        slot.insert(line);
                    }
                },
                Err(e) => audit.invalid.push(InvalidLine {
                    line,
                    input: trimmed.to_string(),
                    error: e.to_string(),
                }),
            }
        }

        audit
    }

    fn print(&self, allow_collisions: bool) {
        for invalid in &self.invalid {
            println!(
                "{} line {}: {}",
                "invalid".failure(),
                invalid.line,
                invalid.error
            );
        }

        for collision in &self.collisions {
            let label = if allow_collisions {
                "duplicate".dim()
            } else {
                "collision".warning()
            };
            println!(
                "{label} line {} is the same key as line {}: {}",
                collision.line, collision.first_line, collision.key
            );
        }

        if self.invalid.is_empty() && self.collisions.is_empty() {
            println!("{}", format!("{} keys ok", self.checked).success());
        } else {
            println!(
                "{} keys checked, {} invalid, {} colliding",
                self.checked,
                self.invalid.len(),
                self.collisions.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_list_has_no_findings() {
        let audit = Audit::of(
            "# stored keys\n\
             domain/shop\n\
             \n\
             domain/shop/subdomain/orders\n\
             domain/shop/subdomain/orders/class/order/state/open\n",
        );

        assert_eq!(audit.checked, 3);
        assert!(audit.invalid.is_empty());
        assert!(audit.collisions.is_empty());
    }

    #[test]
    fn invalid_lines_are_reported_with_line_numbers() {
        let audit = Audit::of("domain/shop\ndomain/shop/subdomain\ndomain/shop/state/x\n");

        let lines: Vec<_> = audit.invalid.iter().map(|i| (i.line, i.input.as_str())).collect();
        assert_eq!(
            lines,
            vec![(2, "domain/shop/subdomain"), (3, "domain/shop/state/x")]
        );
        assert!(audit.invalid[0].error.starts_with("Malformed key"));
    }

    #[test]
    fn case_and_whitespace_variants_collide() {
        let audit = Audit::of(
            "domain/shop/subdomain/orders\n\
             DOMAIN/Shop/subdomain/Orders\n\
             domain/shop\n\
             domain / shop / subdomain / orders \n",
        );

        assert_eq!(
            audit.collisions,
            vec![
                Collision {
                    line: 2,
                    first_line: 1,
                    key: "domain/shop/subdomain/orders".to_string(),
                },
                Collision {
                    line: 4,
                    first_line: 1,
                    key: "domain/shop/subdomain/orders".to_string(),
                },
            ]
        );
    }
}
