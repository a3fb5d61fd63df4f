//! Command-line interface

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use aura_classifiers::{ModelKind, TrainedModel, TrainingOptions, TrainingReport};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "aura-server")]
#[command(about = "Aura mental health chatbot backend", long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Train a distress model from a labeled CSV
    Train(TrainArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Configuration file path (defaults to aura.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Distress model artifact
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Counseling corpus file
    #[arg(long)]
    pub corpus: Option<PathBuf>,
}

impl ServeArgs {
    /// Configuration from file and environment with CLI overrides applied
    pub fn resolve_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(listen) = &self.listen {
            config.server.listen = listen.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(corpus) = &self.corpus {
            config.corpus_path = Some(corpus.clone());
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labeled CSV with `text` and `label` columns
    #[arg(short, long)]
    pub data: PathBuf,

    /// Where to write the model artifact
    #[arg(short, long)]
    pub output: PathBuf,

    /// YAML file with training options
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// random_forest or logistic
    #[arg(long)]
    pub model_kind: Option<ModelKind>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub test_fraction: Option<f64>,

    #[arg(long)]
    pub val_fraction: Option<f64>,
}

impl TrainArgs {
    pub fn training_options(&self) -> Result<TrainingOptions> {
        let mut options = match &self.options {
            Some(path) => TrainingOptions::from_yaml_file(path)
                .with_context(|| format!("Failed to read training options {}", path.display()))?,
            None => TrainingOptions::default(),
        };
        if let Some(kind) = self.model_kind {
            options.model_kind = kind;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            options.test_fraction = fraction;
        }
        if let Some(fraction) = self.val_fraction {
            options.val_fraction = fraction;
        }
        Ok(options)
    }
}

/// Train, log the report and save the artifact
pub fn run_train(args: &TrainArgs) -> Result<TrainingReport> {
    let options = args.training_options()?;
    info!(
        data = %args.data.display(),
        model_kind = options.model_kind.as_str(),
        seed = options.seed,
        "Training distress model"
    );

    let model = TrainedModel::train_from_csv(&args.data, &options)
        .with_context(|| format!("Training on {} failed", args.data.display()))?;
    let report = model.report().clone();

    info!(
        train = report.train_size,
        validation = report.validation_size,
        test = report.test_size,
        features = report.feature_count,
        "Split and feature sizes"
    );
    info!("Validation: {}", report.validation);
    info!("Test: {}", report.test);
    if report.overfitting.is_warning() {
        warn!(gap = report.overfitting.gap, "Validation/test accuracy gap exceeds tolerance");
    } else {
        info!(gap = report.overfitting.gap, verdict = ?report.overfitting.verdict, "Overfitting check");
    }
    for importance in report.feature_importance.iter().take(10) {
        info!(feature = %importance.feature, importance = importance.importance, "Top feature");
    }

    model
        .save(&args.output)
        .with_context(|| format!("Failed to save model to {}", args.output.display()))?;
    info!(path = %args.output.display(), "Model saved");
    Ok(report)
}
