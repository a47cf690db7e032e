//! stockmatch - Catch duplicate material records before they reach inventory
//!
//! Checks new materials against a company's inventory and lets the user
//! merge into a likely duplicate or insert a new record.

mod cli;
mod commands;
mod config;
mod output;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::RuntimeContext;

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(io::stderr(), "Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = RuntimeContext::new(&cli.global)?;
    ctx.init_logging()?;

    log::debug!("Config loaded from: {:?}", ctx.config_path());

    run_command(&ctx, cli.command)
}

fn run_command(ctx: &RuntimeContext, command: Command) -> Result<()> {
    match command {
        Command::Check { candidate, explain } => commands::check::run(ctx, &candidate, explain),
        Command::Config { command } => commands::config::run(ctx, command),
        Command::Completions { shell } => commands::completions::run(shell),
        command => commands::record::run(ctx, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_merge() {
        let cli = Cli::try_parse_from([
            "stockmatch",
            "--company",
            "acme",
            "add",
            "--name",
            "Reclaimed Oak",
            "--category",
            "wood",
            "--quantity",
            "3",
            "--merge",
            "abc",
        ])
        .unwrap();

        match cli.command {
            Command::Add {
                candidate,
                attrs,
                merge,
                new,
            } => {
                assert_eq!(candidate.name.as_deref(), Some("Reclaimed Oak"));
                assert_eq!(attrs.quantity, Some(3.0));
                assert_eq!(merge.as_deref(), Some("abc"));
                assert!(!new);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_merge_conflicts_with_new() {
        let result = Cli::try_parse_from([
            "stockmatch",
            "add",
            "--name",
            "Oak",
            "--category",
            "wood",
            "--merge",
            "abc",
            "--new",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_add_merge_requires_quantity() {
        let result = Cli::try_parse_from([
            "stockmatch",
            "add",
            "--name",
            "Oak",
            "--category",
            "wood",
            "--merge",
            "abc",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_requires_candidate() {
        assert!(Cli::try_parse_from(["stockmatch", "check", "--name", "Oak"]).is_err());
        assert!(Cli::try_parse_from(["stockmatch", "check", "--data", "{}"]).is_ok());
    }
}
