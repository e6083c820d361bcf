//! `reqkey`: build, parse, preen and audit requirements model keys.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
