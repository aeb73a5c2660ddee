use anyhow::Result;
use clap::Parser;
use class_rewriter::cli::{Cli, OutputFormat};
use class_rewriter::config::{resolve_matched_paths, rewrite_config, transformer_options};
use class_rewriter::logging;
use class_rewriter::pipeline::{Rewriter, RunSummary};
use class_rewriter::transform::TransformerRegistry;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = rewrite_config(&cli);
    let registry = TransformerRegistry::default();
    let mut rewriter = Rewriter::from_config(&config, &registry, &transformer_options(&cli))?;

    let paths = resolve_matched_paths(&cli, &config)?;
    let summary = rewriter.run(&paths)?;
    write_summary(&summary, cli.format)?;

    Ok(())
}

fn write_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => {
            println!("source_root: {}", summary.source_root);
            println!("destination_root: {}", summary.destination_root);
            println!("matched: {}", summary.matched);
            println!("rewritten_classes: {}", summary.rewritten_classes);
            println!(
                "rewritten_archives: {} (transformed {}, copied {})",
                summary.rewritten_archives, summary.transformed_entries, summary.copied_entries
            );
            println!("skipped_up_to_date: {}", summary.skipped_up_to_date);
            println!("ignored: {}", summary.ignored);
            println!("duration_ms: {}", summary.duration_ms);
        }
    }
    Ok(())
}
