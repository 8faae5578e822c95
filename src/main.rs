//! `kubeconfig-merge`: merge kubeconfig fragments into one file.
//!
//! Every file found under `--directory` (recursively) and every `--file` is
//! merged into `--target`. Entries already present in the target are never
//! replaced; among the other sources, later files win.
//!
//! Logging goes to stderr. Set `RUST_LOG` to override the default `warn`
//! level, or pass `--verbose`.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use kubeconfig_merge::{discover::expand_home, run, CurrentContextPolicy, MergeOptions};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_TARGET: &str = "~/.kube/config";

/// Merge kubeconfig files into one target file
#[derive(Parser, Debug)]
#[command(name = "kubeconfig-merge")]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("sources")
        .required(true)
        .multiple(true)
        .args(["directories", "files"])
))]
struct Args {
    /// Directory to search recursively for config files (repeatable)
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    directories: Vec<PathBuf>,

    /// Config file to merge (repeatable)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    files: Vec<PathBuf>,

    /// File to merge everything into; its own entries take precedence
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_TARGET)]
    target: String,

    /// Which source decides the resulting current-context
    #[arg(long, value_enum, default_value_t = ContextFrom::Last)]
    current_context_from: ContextFrom,

    /// List the contexts of every merged source and log progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContextFrom {
    /// The last merged source (the target, when it exists)
    Last,
    /// The target, falling back to the last source when the target has none
    Target,
}

impl From<ContextFrom> for CurrentContextPolicy {
    fn from(value: ContextFrom) -> Self {
        match value {
            ContextFrom::Last => CurrentContextPolicy::LastSource,
            ContextFrom::Target => CurrentContextPolicy::Authoritative,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let target = expand_home(&args.target);
    let mut options = MergeOptions::new(&target).current_context(args.current_context_from.into());
    for dir in &args.directories {
        options = options.with_directory(dir);
    }
    for file in &args.files {
        options = options.with_file(file);
    }

    let report = run(&options).with_context(|| format!("merge into '{}' failed", target.display()))?;

    if args.verbose {
        print!("{}", report.summary());
    }

    Ok(())
}
