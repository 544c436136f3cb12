mod manifest;

use anyhow::{Context, Result, bail};
use argkit::{AliasTable, Invocation, Outcome, Program, tokenize};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::manifest::{LoadedManifest, load_manifest, write_default_manifest};

#[derive(Parser)]
#[command(name = "argkit")]
#[command(version, about = "Permissive argv tokenizer and command dispatcher", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter argkit.json manifest
    Init(InitArgs),

    /// Tokenize arguments and print the parse result as JSON
    Tokenize(TokenizeArgs),

    /// Render help for the manifest program or one of its commands
    Help(HelpArgs),

    /// Dispatch arguments against the manifest program
    Dispatch(DispatchArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Program name (default: directory name)
    #[arg(short, long)]
    name: Option<String>,

    /// Overwrite an existing manifest
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct TokenizeArgs {
    /// Path to an argkit.json manifest supplying option aliases
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Match flag spellings case-sensitively
    #[arg(long)]
    strict: bool,

    /// Declare an alias entry: NAME=SPELLING[,SPELLING]
    #[arg(short, long = "alias", value_name = "NAME=SPELLINGS")]
    alias: Vec<String>,

    /// Arguments to tokenize (pass after `--`)
    #[arg(last = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct HelpArgs {
    /// Path to an argkit.json manifest
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Command to describe
    #[arg(value_name = "COMMAND")]
    command: Option<String>,
}

#[derive(Parser)]
struct DispatchArgs {
    /// Path to an argkit.json manifest
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Arguments to dispatch (pass after `--`)
    #[arg(last = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Tokenize(args) => tokenize_command(args),
        Commands::Help(args) => help_command(args),
        Commands::Dispatch(args) => dispatch_command(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let dest = write_default_manifest(&dir, args.name.as_deref(), args.force)?;

    eprintln!("Created: {}", dest.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {} to declare options and commands", dest.display());
    eprintln!("  2. Run: argkit help -m {}", dest.display());
    eprintln!("  3. Run: argkit dispatch -m {} -- hello world", dest.display());

    Ok(())
}

fn tokenize_command(args: TokenizeArgs) -> Result<()> {
    let loaded = load_manifest(args.manifest.as_deref())?;
    let base = match &loaded {
        Some(loaded) => manifest_program(loaded)?.alias_table(),
        None => AliasTable::new(),
    };
    let strict = args.strict || base.is_strict();
    let mut table = base.strict(strict);
    for entry in &args.alias {
        let (name, spellings) = parse_alias(entry)?;
        table.insert(name, spellings.as_slice());
    }

    tracing::debug!(entries = table.len(), strict, "tokenizing");
    let result = tokenize(args.args.as_slice(), &table);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn help_command(args: HelpArgs) -> Result<()> {
    let program = require_program(args.manifest)?;
    print!("{}", argkit::render_help(&program, args.command.as_deref()));
    Ok(())
}

fn dispatch_command(args: DispatchArgs) -> Result<()> {
    let program = require_program(args.manifest)?;
    match program.parse(args.args.as_slice())? {
        Outcome::Help(text) | Outcome::Version(text) => print!("{text}"),
        Outcome::Handled(_) => {}
        // Every manifest program has a fallback action.
        Outcome::Unhandled(inv) => print_invocation(&inv)?,
    }
    Ok(())
}

fn require_program(path: Option<PathBuf>) -> Result<Program> {
    let Some(loaded) = load_manifest(path.as_deref())? else {
        bail!(
            "no {} in the current directory (run `argkit init` or pass --manifest)",
            manifest::DEFAULT_MANIFEST_NAME
        );
    };
    manifest_program(&loaded)
}

fn manifest_program(loaded: &LoadedManifest) -> Result<Program> {
    loaded
        .manifest
        .to_program(print_invocation)
        .with_context(|| format!("failed to load {}", loaded.path.display()))
}

fn print_invocation(inv: &Invocation) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(inv)?);
    Ok(())
}

/// Split `NAME=SPELLING[,SPELLING]` into a canonical name and dash-less spellings.
fn parse_alias(entry: &str) -> Result<(String, Vec<String>)> {
    let Some((name, spellings)) = entry.split_once('=') else {
        bail!("invalid alias `{entry}`: expected NAME=SPELLING[,SPELLING]");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid alias `{entry}`: missing name");
    }
    let spellings: Vec<String> = spellings
        .split(',')
        .map(|s| s.trim().trim_start_matches('-'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if spellings.is_empty() {
        bail!("invalid alias `{entry}`: no spellings");
    }
    Ok((name.to_string(), spellings))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
