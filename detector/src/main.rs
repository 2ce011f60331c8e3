// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Fake news prediction CLI
//!
//! Usage:
//!   fakenews-predict "Breaking: free gold for every citizen tomorrow"
//!   fakenews-predict --file items.txt --json
//!   fakenews-predict --artifacts ./artifacts/models

use anyhow::{Context, Result};
use clap::Parser;
use fakenews_detector::config::PredictorConfig;
use fakenews_detector::predictor::FakeNewsPredictor;
use fakenews_detector::service::{AnalysisReport, AnalysisService, BatchOutcome, BatchReport, ItemKind};
use fakenews_detector::text;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fakenews-predict")]
#[command(about = "Classify news text as fake or real")]
#[command(version)]
struct Args {
    /// Text to analyze; omit for interactive mode
    text: Option<String>,

    /// File with one item (text or URL) per line, analyzed as a batch
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the trained artifacts (overrides the config)
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Language the analyzed text is displayed in
    #[arg(short, long, default_value = "en")]
    target_lang: String,

    /// Print JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Apply the training-time cleaner before analysis
    #[arg(long)]
    clean: bool,
}

fn print_report(report: &AnalysisReport) {
    println!("{}", report.verdict.summary());
    println!();
    println!("Text           : {}", report.display_text);
    println!("Sentiment      : {:?} ({:.2})", report.sentiment.label, report.sentiment.score);
    println!("Source Trust   : {} ({})", report.trust.label, report.trust.score);
    println!(
        "Readability    : {} words, {:.2} avg chars/word",
        report.stats.word_count, report.stats.avg_word_length
    );
}

fn print_batch(report: &BatchReport) {
    println!("\n{}", "=".repeat(70));
    println!("BATCH {} ({} items, {:.2}s)", report.batch_id, report.total_items, report.execution_time);
    println!("{}", "=".repeat(70));
    println!("{:<8} {:<6} {:<10} {:>10} {:<8}  {}", "Time", "Type", "Result", "Conf", "Risk", "Item");
    println!("{:-<70}", "");

    for result in &report.results {
        let (outcome, confidence, risk) = match &result.outcome {
            BatchOutcome::Analyzed { verdict } => (
                verdict.prediction.to_string(),
                format!("{:.2}%", verdict.confidence * 100.0),
                verdict.risk_level.as_str().to_string(),
            ),
            BatchOutcome::Skipped { trust } => ("Skipped".to_string(), format!("trust {}", trust.score), "-".to_string()),
            BatchOutcome::Error { message } => ("Error".to_string(), "-".to_string(), message.clone()),
        };
        println!(
            "{:<8} {:<6} {:<10} {:>10} {:<8}  {}",
            result.timestamp,
            format!("{:?}", result.kind),
            outcome,
            confidence,
            risk,
            result.item
        );
    }
    println!("{:-<70}", "");
}

fn prepare(text: &str, clean: bool) -> String {
    if clean {
        text::clean_for_training(text)
    } else {
        text.to_string()
    }
}

/// Clean a batch text item; URLs pass through unchanged
fn prepare_item(item: &str, clean: bool) -> String {
    match ItemKind::of(item) {
        ItemKind::Url => item.to_string(),
        ItemKind::Text => prepare(item, clean),
    }
}

fn interactive(predictor: &FakeNewsPredictor, args: &Args) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("Fake news detector (type 'exit' to quit)");
    loop {
        print!("\nEnter news text: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if matches!(line.to_lowercase().as_str(), "exit" | "quit" | "q") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match predictor.predict(&prepare(line, args.clean)) {
            Ok(verdict) if args.json => println!("{}", serde_json::to_string_pretty(&verdict)?),
            Ok(verdict) => println!("\n{}", verdict.summary()),
            Err(e) => {
                tracing::error!("Prediction failed: {:#}", e);
                println!("Failed to analyze the provided input.");
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PredictorConfig::load(path)?,
        None => PredictorConfig::default(),
    };
    if let Some(dir) = &args.artifacts {
        config.artifacts_dir = dir.clone();
    }

    let predictor = Arc::new(FakeNewsPredictor::from_config(&config)?);
    let service = AnalysisService::new(predictor.clone());

    if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read items: {}", path.display()))?;
        let items: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| prepare_item(l, args.clean))
            .collect();

        let report = service.analyze_batch(&items)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_batch(&report);
        }
        return Ok(());
    }

    if let Some(text) = &args.text {
        let report = service.analyze(&prepare(text, args.clean), &args.target_lang)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        return Ok(());
    }

    interactive(&predictor, &args)
}
