use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hclquill::config::Config;
use hclquill::document::tree::HclTree;
use hclquill::file::loader::{load_hcl_file, load_hcl_from_stdin};
use hclquill::file::saver::{save_hcl_file, write_hcl};
use hclquill::hclpath::{format_value, Parser as PathParser, ValueType, Walker};

/// hclquill - Read or rewrite a single value in an HCL document
#[derive(Parser)]
#[command(name = "hclquill")]
#[command(version)]
#[command(about = "Read or rewrite a single value in an HCL document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at QUERY_PATH
    Get {
        /// Path such as `obj.val` or `some[map].item`
        query_path: String,

        /// HCL file to read (reads stdin if not provided)
        hcl_file: Option<PathBuf>,

        /// Fail if the path matches nothing
        #[arg(long)]
        strict: bool,
    },

    /// Replace the value at QUERY_PATH and print the document
    Set {
        /// Path such as `obj.val` or `some[map].item`
        query_path: String,

        /// New value, checked against --type
        value: String,

        /// HCL file to read (reads stdin if not provided)
        hcl_file: Option<PathBuf>,

        /// Value type: string, bool, int or float (default from config: string)
        #[arg(short = 't', long = "type")]
        value_type: Option<String>,

        /// Rewrite HCL_FILE instead of printing
        #[arg(short, long)]
        in_place: bool,

        /// Fail if the path matches nothing
        #[arg(long)]
        strict: bool,
    },

    /// Print the document in canonical layout
    Fmt {
        /// HCL file to read (reads stdin if not provided)
        hcl_file: Option<PathBuf>,

        /// Rewrite HCL_FILE instead of printing
        #[arg(short, long)]
        in_place: bool,
    },
}

/// Maps `-v` occurrences to a log level; warnings are always shown.
fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG, when set, overrides the -v level
    env_logger::Builder::new()
        .filter_level(verbosity_level(verbose))
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load();
    log::debug!("using config {:?}", config);

    match cli.command {
        Commands::Get {
            query_path,
            hcl_file,
            strict,
        } => run_get(&query_path, hcl_file.as_deref(), strict || config.strict),
        Commands::Set {
            query_path,
            value,
            hcl_file,
            value_type,
            in_place,
            strict,
        } => {
            let value_type = value_type.unwrap_or_else(|| config.default_type.clone());
            let options = SetOptions {
                value_type: &value_type,
                in_place,
                strict: strict || config.strict,
            };
            run_set(&query_path, &value, hcl_file.as_deref(), options, &config)
        }
        Commands::Fmt { hcl_file, in_place } => run_fmt(hcl_file.as_deref(), in_place, &config),
    }
}

/// Reads the document from `path`, or from stdin when no path is given.
fn load_document(path: Option<&Path>) -> Result<HclTree> {
    match path {
        Some(path) => load_hcl_file(path),
        None => load_hcl_from_stdin(),
    }
}

/// Writes the tree back to `path` when editing in place, else to stdout.
fn emit_document(tree: &HclTree, path: Option<&Path>, in_place: bool, config: &Config) -> Result<()> {
    match (in_place, path) {
        (true, Some(path)) => save_hcl_file(path, tree, config),
        _ => write_hcl(&mut io::stdout().lock(), tree, config),
    }
}

fn require_file_for_in_place(path: Option<&Path>, in_place: bool) -> Result<()> {
    if in_place && path.is_none() {
        bail!("--in-place needs an HCL_FILE; stdin cannot be rewritten");
    }
    Ok(())
}

fn run_get(query_path: &str, hcl_file: Option<&Path>, strict: bool) -> Result<()> {
    let query = PathParser::parse(query_path)?;
    let tree = load_document(hcl_file)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Walker::new(&query).strict(strict).get(&tree, &mut out)?;
    out.flush()?;
    Ok(())
}

struct SetOptions<'a> {
    value_type: &'a str,
    in_place: bool,
    strict: bool,
}

fn run_set(
    query_path: &str,
    value: &str,
    hcl_file: Option<&Path>,
    options: SetOptions<'_>,
    config: &Config,
) -> Result<()> {
    require_file_for_in_place(hcl_file, options.in_place)?;

    // Tag, path and value are all checked before any input is read.
    let value_type: ValueType = options.value_type.parse()?;
    let query = PathParser::parse(query_path)?;
    let literal = format_value(value, value_type)?;

    let mut tree = load_document(hcl_file)?;
    let matches = Walker::new(&query)
        .strict(options.strict)
        .set(&mut tree, &literal)?;
    log::info!("replaced {} value(s) at {}", matches, query);

    emit_document(&tree, hcl_file, options.in_place, config)
}

fn run_fmt(hcl_file: Option<&Path>, in_place: bool, config: &Config) -> Result<()> {
    require_file_for_in_place(hcl_file, in_place)?;
    let tree = load_document(hcl_file)?;
    emit_document(&tree, hcl_file, in_place, config)
}
