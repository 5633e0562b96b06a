//! Command-line tool that turns a YAML brief into a PR-driven agent system.
//!
//! Usage:
//!   brief build <BRIEF> --out <DIR>   Generate the agent system
//!   brief check <BRIEF>               Parse and normalize a brief
//!   brief validate <DIR>              Check a generated system
//!
//! Any error is printed as `Error: <message>` and exits with status 1.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use libbrief::{ParseOptions, DEFAULT_MAX_DEPTH};
use log::{info, warn};

mod brief;
mod error;
mod generate;
mod render;
mod validate;

use error::BriefError;

#[derive(Debug, Parser)]
#[command(name = "brief")]
#[command(about = "Generate a PR-driven agent system from a YAML brief", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate an agent system from a brief
    Build(BuildArgs),
    /// Parse and normalize a brief without writing anything
    Check(CheckArgs),
    /// Validate a generated agent system
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Deepest block nesting accepted in the brief
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl ParseArgs {
    fn options(&self) -> ParseOptions {
        ParseOptions::default().with_max_depth(self.max_depth)
    }
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Path to the system brief
    brief: PathBuf,

    /// Output directory (must be empty or absent)
    #[arg(short, long)]
    out: PathBuf,

    #[command(flatten)]
    parse: ParseArgs,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Path to the system brief
    brief: PathBuf,

    #[command(flatten)]
    parse: ParseArgs,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Root of the generated system
    #[arg(default_value = ".")]
    dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Build(args) => build(&args)?,
        Command::Check(args) => check(&args)?,
        Command::Validate(args) => {
            if !validate(&args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Read the brief and normalize it, returning the source text as well.
fn read_brief(
    path: &Path,
    options: &ParseOptions,
) -> Result<(brief::Brief, Vec<String>, String)> {
    if !path.exists() {
        return Err(BriefError::BriefNotFound(path.to_path_buf()).into());
    }
    let text = fs::read_to_string(path).map_err(|e| BriefError::io(path, e))?;
    let data = brief::load_brief(&text, options)?;
    let (brief, questions) = brief::normalize(&data)?;
    Ok((brief, questions, text))
}

fn build(args: &BuildArgs) -> Result<()> {
    let (brief, questions, text) = read_brief(&args.brief, &args.parse.options())?;
    for question in &questions {
        info!("open question: {}", question);
    }
    generate::generate(&args.out, &brief, &questions, &text)?;
    info!("agent system written to {}", args.out.display());
    Ok(())
}

fn check(args: &CheckArgs) -> Result<()> {
    let (brief, questions, _) = read_brief(&args.brief, &args.parse.options())?;
    for question in &questions {
        warn!("{}: {}", args.brief.display(), question);
    }
    println!(
        "{}: ok ({} roles, {} policies, {} references)",
        args.brief.display(),
        brief.roles.len(),
        brief.policies.len(),
        brief.references.len()
    );
    Ok(())
}

/// Print the validation report. Returns whether the system passed.
fn validate(args: &ValidateArgs) -> Result<bool> {
    let errors = validate::validate_system(&args.dir)
        .with_context(|| format!("cannot validate {}", args.dir.display()))?;

    if errors.is_empty() {
        println!("Validation passed.");
        return Ok(true);
    }

    println!("Validation failed:");
    for error in &errors {
        println!("- {}", error);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_args() {
        let cli = Cli::parse_from(["brief", "build", "brief.yaml", "--out", "system"]);
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.brief, PathBuf::from("brief.yaml"));
                assert_eq!(args.out, PathBuf::from("system"));
                assert_eq!(args.parse.max_depth, DEFAULT_MAX_DEPTH);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_missing_brief_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.yaml");
        let err = read_brief(&path, &ParseOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("Brief file not found: "));
    }

    #[test]
    fn test_build_then_validate() {
        let tmp = tempfile::tempdir().unwrap();
        let brief_path = tmp.path().join("brief.yaml");
        fs::write(&brief_path, "system:\n  name: demo\nroles:\n  - name: owner\n").unwrap();
        let out = tmp.path().join("system");

        let args = BuildArgs {
            brief: brief_path,
            out: out.clone(),
            parse: ParseArgs {
                max_depth: DEFAULT_MAX_DEPTH,
            },
        };
        build(&args).unwrap();
        assert!(validate(&ValidateArgs { dir: out }).unwrap());
    }

    #[test]
    fn test_max_depth_flag_applies() {
        let tmp = tempfile::tempdir().unwrap();
        let brief_path = tmp.path().join("brief.yaml");
        fs::write(&brief_path, "system:\n  name: demo\n").unwrap();
        let options = ParseOptions::default().with_max_depth(1);
        let err = read_brief(&brief_path, &options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Nesting exceeds maximum depth of 1 at line 2."
        );
    }
}
