use anyhow::Result;
use std::env;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::pipeline::RewriteConfig;
use crate::scan::{PathFilter, list_matched_relative_paths};
use crate::transform::{ASM, TransformerOptions};

pub const MODE_ENV: &str = "CLASS_REWRITER_MODE";
pub const AGENT_ENV: &str = "CLASS_REWRITER_AGENT";

pub fn resolve_mode(cli: &Cli) -> String {
    if let Some(m) = cli.mode.clone() {
        return m;
    }

    if let Ok(m) = env::var(MODE_ENV)
        && !m.trim().is_empty()
    {
        return m;
    }

    ASM.to_string()
}

pub fn resolve_agent(cli: &Cli) -> Option<PathBuf> {
    if let Some(p) = cli.agent.clone() {
        return Some(p);
    }

    env::var_os(AGENT_ENV)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

pub fn resolve_source_root(cli: &Cli) -> PathBuf {
    cli.src_dir.clone().unwrap_or_default()
}

pub fn resolve_destination_root(cli: &Cli) -> PathBuf {
    cli.dest_dir
        .clone()
        .unwrap_or_else(|| resolve_source_root(cli))
}

pub fn rewrite_config(cli: &Cli) -> RewriteConfig {
    RewriteConfig {
        matched_paths: cli.paths.clone(),
        transformer_kind: resolve_mode(cli),
        ..RewriteConfig::new(resolve_source_root(cli), resolve_destination_root(cli))
    }
}

pub fn transformer_options(cli: &Cli) -> TransformerOptions {
    TransformerOptions {
        agent_command: resolve_agent(cli),
    }
}

pub fn path_filter(cli: &Cli) -> PathFilter {
    PathFilter {
        includes: cli.includes.clone(),
        excludes: cli.excludes.clone(),
    }
}

/// Explicit paths win; otherwise the source root is scanned with the
/// include/exclude filter.
pub fn resolve_matched_paths(cli: &Cli, config: &RewriteConfig) -> Result<Vec<PathBuf>> {
    if !config.matched_paths.is_empty() {
        return Ok(config.matched_paths.clone());
    }
    list_matched_relative_paths(&config.source_root, &path_filter(cli))
}
