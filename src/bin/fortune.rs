//! `fortune`: print a random, hopefully interesting, adage.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use fortune_core::config::{FortuneConfig, SearchSet};
use fortune_core::selection::{matching_fortunes, time_seeded_rng, FortuneSelector};
use fortune_core::strfile::{default_index_path, StrfileBuilder, StrfileConfig, DEFAULT_DELIMITER};
use fortune_core::tree::{assign_probabilities, build_tree, parse_probability_args, FileSystemNode};
use fortune_core::{FortuneRecord, Result};

#[derive(Parser)]
#[command(name = "fortune")]
#[command(about = "Print a random, hopefully interesting, adage")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    fortune: FortuneArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a random access index file for a delimited fortune file
    Strfile(StrfileArgs),
}

#[derive(Args)]
struct FortuneArgs {
    /// Choose from all lists of maxims
    #[arg(short = 'a', long)]
    all: bool,

    /// Choose only from potentially offensive aphorisms
    #[arg(short = 'o', long, conflicts_with = "all")]
    offensive: bool,

    /// Show the cookie file from which the fortune came
    #[arg(short = 'c', long)]
    show_file: bool,

    /// Print the files that would be searched, with their shares, and exit
    #[arg(short = 'f', long)]
    list_files: bool,

    /// Consider all fortune files to be of equal size
    #[arg(short = 'e', long)]
    equal: bool,

    /// Print every fortune matching this regular expression
    #[arg(short = 'm', long = "match", value_name = "PATTERN")]
    pattern: Option<String>,

    /// Ignore case for -m patterns
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Longest fortune length, in bytes, still considered short
    #[arg(short = 'n', long, value_name = "BYTES")]
    longest_short: Option<u32>,

    /// Long dictums only
    #[arg(short = 'l', long, conflicts_with = "short")]
    long: bool,

    /// Short apothegms only
    #[arg(short = 's', long)]
    short: bool,

    /// Wait after printing, for a time derived from the fortune's length
    #[arg(short = 'w', long)]
    wait: bool,

    /// Emit JSON instead of plain text
    #[arg(long)]
    json: bool,

    /// Configuration file (defaults to ~/.gofortune.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fortune files or directories, each optionally preceded by a weight such as 30%
    #[arg(value_name = "[N%] PATH")]
    paths: Vec<String>,
}

#[derive(Args)]
struct StrfileArgs {
    /// Delimiting line between fortunes, a single byte
    #[arg(short = 'c', long, default_value = DEFAULT_DELIMITER)]
    delimiter: String,

    /// Ignore case when ordering the strings
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Run silently
    #[arg(short = 's', long)]
    silent: bool,

    /// Order the strings alphabetically (wins over --randomize)
    #[arg(short = 'o', long)]
    order: bool,

    /// Randomize access to the strings
    #[arg(short = 'n', long)]
    randomize: bool,

    /// The source text is rotated 13 positions in a simple caesar cypher
    #[arg(short = 'x', long)]
    rot13: bool,

    /// Delimited fortune file
    source: PathBuf,

    /// Index file to write (defaults to the source with a .dat extension)
    index: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Strfile(args)) => run_strfile(args),
        None => run_fortune(cli.fortune),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fortune: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_strfile(args: StrfileArgs) -> Result<()> {
    let config = StrfileConfig {
        delimiter: args.delimiter,
        ignore_case: args.ignore_case,
        rotate13: args.rot13,
        order: args.order,
        randomize: args.randomize,
    };
    let index = args.index.unwrap_or_else(|| default_index_path(&args.source));

    let mut builder = StrfileBuilder::new(config);
    if !args.silent {
        builder = builder.with_observer(|stats| print!("{}", stats.summary()));
    }
    builder.build(&args.source, &index, &mut time_seeded_rng())?;
    Ok(())
}

fn run_fortune(args: FortuneArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => FortuneConfig::load(path)?,
        None => FortuneConfig::discover()?,
    };
    if let Some(n) = args.longest_short {
        config.longest_short = n;
    }

    let set = if args.all {
        SearchSet::All
    } else if args.offensive {
        SearchSet::Offensive
    } else {
        SearchSet::Normal
    };
    let paths = if args.paths.is_empty() {
        config.search_paths(set)
    } else {
        parse_probability_args(&args.paths)
    };

    let mut root = build_tree(&paths)?;

    if let Some(pattern) = &args.pattern {
        for record in matching_fortunes(&root, pattern, args.ignore_case)? {
            print_fortune(&args, &config, &record?)?;
        }
        return Ok(());
    }

    assign_probabilities(&mut root, args.equal);

    if args.list_files {
        return print_file_list(&root, args.json);
    }

    let mut selector = FortuneSelector::default();
    let record = if args.short || args.long {
        let shorter_than = if args.short { config.longest_short } else { u32::MAX };
        let longer_than = if args.long { config.longest_short } else { 0 };
        selector.length_filtered_random_fortune(&root, shorter_than, longer_than)?
    } else {
        selector.random_fortune(&root)?
    };
    print_fortune(&args, &config, &record)
}

fn print_fortune(args: &FortuneArgs, config: &FortuneConfig, record: &FortuneRecord) -> Result<()> {
    let mut out = io::stdout().lock();
    if args.json {
        let line = serde_json::to_string(record).map_err(io::Error::from)?;
        writeln!(out, "{line}")?;
    } else {
        if args.show_file {
            writeln!(out, "({})\n%", record.file_name)?;
        }
        write!(out, "{}", record.text)?;
        if !record.text.ends_with('\n') {
            writeln!(out)?;
        }
    }
    out.flush()?;
    drop(out);

    if args.wait {
        thread::sleep(Duration::from_secs(config.wait_seconds(record.len())));
    }
    Ok(())
}

fn print_file_list(root: &FileSystemNode, json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, root).map_err(io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }

    for child in &root.children {
        writeln!(out, "{:5.2}% {}", child.percent, child.path.display())?;
        for grandchild in &child.children {
            writeln!(out, "    {:5.2}% {}", grandchild.percent, grandchild.file_name())?;
        }
    }
    Ok(())
}
