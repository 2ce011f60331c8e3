// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Classifier training CLI
//!
//! Usage:
//!   fakenews-train --data Fake.csv --data True.csv --output artifacts/models
//!   fakenews-train --seed 7 --max-features 3000

use anyhow::Result;
use clap::Parser;
use fakenews_detector::datasets::CsvLayout;
use fakenews_detector::training::{Trainer, TrainingConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fakenews-train")]
#[command(about = "Train the TF-IDF + logistic regression classifier")]
#[command(version)]
struct Args {
    /// Labeled CSV file (repeatable); the synthetic corpus is used when omitted
    #[arg(short, long)]
    data: Vec<PathBuf>,

    /// Name of the text column
    #[arg(long, default_value = "text")]
    text_column: String,

    /// Name of the label column
    #[arg(long, default_value = "label")]
    label_column: String,

    /// Output directory for artifacts and reports
    #[arg(short, long, default_value = "artifacts/models")]
    output: PathBuf,

    /// Random seed for the train/test split
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Vocabulary size cap
    #[arg(long, default_value_t = 5000)]
    max_features: usize,

    /// Fraction of each label held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// Maximum optimizer iterations
    #[arg(long, default_value_t = 1000)]
    max_iter: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = TrainingConfig {
        seed: args.seed,
        data_paths: args.data,
        layout: CsvLayout {
            text_column: args.text_column,
            label_column: args.label_column,
        },
        test_size: args.test_size,
        output_dir: args.output.clone(),
        ..Default::default()
    };
    config.tfidf.max_features = args.max_features;
    config.model.max_iter = args.max_iter;

    tracing::info!("Fake News Classifier Training");
    tracing::info!("=============================");
    tracing::info!("Seed: {}", config.seed);
    tracing::info!("Output: {}", config.output_dir.display());

    let pb = ProgressBar::new(config.model.max_iter as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Training [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let trainer = Trainer::new(config);
    let report = trainer.run(|iter, loss| {
        pb.set_position(iter as u64);
        pb.set_message(format!("loss {:.5}", loss));
    })?;
    pb.finish_with_message(format!("converged after {} iterations", report.iterations));

    Trainer::save_report(&report, &args.output)?;

    println!("\n{}", "=".repeat(60));
    println!("TRAINING SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Train samples : {}", report.dataset.train_samples);
    println!("Test samples  : {}", report.dataset.test_samples);
    println!("Features      : {}", report.n_features);
    match &report.metrics {
        Some(metrics) => println!("\n{}", metrics.format()),
        None => println!("\nNo held-out samples; evaluation skipped."),
    }
    println!("Artifacts saved to: {}", args.output.display());

    Ok(())
}
