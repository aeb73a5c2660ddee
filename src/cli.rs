use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "class-rewriter")]
#[command(about = "Rewrite Java classes and the classes inside jar/war/ear/zip archives")]
pub struct Cli {
    /// Directory the input files are read from.
    #[arg(long = "src-dir", value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Directory the rewritten files are written to. Defaults to --src-dir.
    #[arg(long = "dest-dir", value_name = "DIR")]
    pub dest_dir: Option<PathBuf>,

    /// Transformer name, case-insensitive.
    #[arg(long, value_name = "NAME")]
    pub mode: Option<String>,

    /// Program that rewrites one class from stdin to stdout.
    #[arg(long, value_name = "FILE")]
    pub agent: Option<PathBuf>,

    #[arg(long = "include", value_name = "GLOB")]
    pub includes: Vec<String>,

    #[arg(long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Paths relative to --src-dir. When omitted the source tree is scanned.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
