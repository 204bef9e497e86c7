//! Synthetic Dataset Generation Tool
//!
//! Configuration-driven driver for exercising the generation pipeline
//! end to end over synthetic label pools. Useful for smoke-testing a
//! partitioning configuration before wiring in a real dataset loader.
//!
//! # Output
//!
//! - `<output_dir>/config.json` - generation manifest
//! - `<output_dir>/train/train.json` - train shards
//! - `<output_dir>/test/test.json` - test shards
//!
//! # Usage
//!
//! ```bash
//! # From TOML config
//! cargo run --release --bin generate_dataset -- --config configs/mnist_20c.toml
//!
//! # Generate sample config
//! cargo run --release --bin generate_dataset -- --generate-config configs/sample.toml
//! ```

use fedshard::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Tool configuration: generator parameters plus synthetic pool shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolConfig {
    /// Directory receiving manifest and shard files.
    output_dir: PathBuf,

    /// Synthetic pool size per label.
    samples_per_label: usize,

    /// Generator parameters.
    generator: GeneratorConfig,
}

impl ToolConfig {
    fn sample() -> Self {
        Self {
            output_dir: PathBuf::from("data/generated"),
            samples_per_label: 5000,
            generator: GeneratorConfig::new(20, 10).with_seed(42),
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--config" => {
            if args.len() < 3 {
                eprintln!("Error: --config requires a path argument");
                std::process::exit(1);
            }
            run_from_config(&args[2]);
        }
        "--generate-config" => {
            if args.len() < 3 {
                eprintln!("Error: --generate-config requires a path argument");
                std::process::exit(1);
            }
            generate_sample_config(&args[2]);
        }
        "--help" | "-h" => {
            print_usage(&args[0]);
        }
        _ => {
            eprintln!("Unknown argument: {}", args[1]);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        r#"
Synthetic Dataset Generation Tool

Usage:
    {program} --config <path.toml>       Generate a dataset from a config file
    {program} --generate-config <path>   Write a sample config file
    {program} --help                     Show this help

Examples:
    # 20 clients, 10 labels, IID
    {program} --config configs/iid_20c.toml

    # Write a starting point to edit
    {program} --generate-config configs/my_dataset.toml
"#
    );
}

fn generate_sample_config(path: &str) {
    let config = ToolConfig::sample();

    let toml_string = match toml::to_string_pretty(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to serialize sample config: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = fs::write(path, toml_string) {
        eprintln!("Error: failed to write {}: {}", path, e);
        std::process::exit(1);
    }

    println!("Sample config written to {}", path);
}

fn run_from_config(path: &str) {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let tool_config: ToolConfig = match toml::from_str(&contents) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid config {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let generator = match DatasetGenerator::new(
        tool_config.generator.clone(),
        tool_config.output_dir.join("config.json"),
        tool_config.output_dir.join("train/train.json"),
        tool_config.output_dir.join("test/test.json"),
    ) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let pools = synthetic_pools(
        tool_config.generator.partition.num_labels,
        tool_config.samples_per_label,
    );

    match generator.generate(pools) {
        Ok(GenerationOutcome::Skipped) => {
            println!("Nothing to do.");
        }
        Ok(GenerationOutcome::Generated(manifest)) => {
            println!(
                "Generated {} samples for {} clients.",
                manifest.total_samples, manifest.num_clients
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Build synthetic label pools; each sample payload is its global index.
fn synthetic_pools(num_labels: usize, samples_per_label: usize) -> Vec<Vec<u32>> {
    (0..num_labels)
        .map(|label| {
            let start = (label * samples_per_label) as u32;
            (start..start + samples_per_label as u32).collect()
        })
        .collect()
}
