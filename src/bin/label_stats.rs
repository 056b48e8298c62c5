//! Print the value distribution of every human-evaluation label field.

use anyhow::{Context, Result};
use attemptviz::labels::{distributions, load_labels};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "label-stats")]
#[command(about = "Summarize human evaluation labels per field")]
struct Args {
    /// Directory with labels_<attempt>.json files
    #[arg(long, default_value = "human_labels")]
    labels_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    let labels = load_labels(&args.labels_dir)
        .with_context(|| format!("Failed to read labels from {}", args.labels_dir.display()))?;
    let dist = distributions(labels.values());

    println!("Analyzed {} files", dist.files);
    println!("{:=<50}", "");

    if dist.fields.is_empty() {
        println!("\nNo labelled fields found.");
        return Ok(());
    }

    for (field, counts) in &dist.fields {
        let total = dist.total(field);
        println!("\n{} Distribution:", field.to_uppercase());
        println!("{:-<30}", "");
        for (value, count) in counts {
            let percentage = *count as f64 / total as f64 * 100.0;
            println!("  {:<15} : {:>3} ({:5.1}%)", value, count, percentage);
        }
        println!("  Total responses: {}", total);
    }

    Ok(())
}
