//! Trained distress model: training protocol, inference and persistence

use crate::classifier::DistressClassifier;
use crate::config::TrainingOptions;
use crate::dataset::LabeledDataset;
use crate::evaluation::{EvaluationMetrics, OverfittingCheck};
use crate::features::{AuxFeatures, FeatureExtractor, FeatureRecord, FeatureVector};
use crate::model::{ClassifierModel, LogisticRegression, ModelKind, RandomForest};
use crate::split::DataSplit;
use aura_core::{DistressPrediction, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Artifact layout version; bump when the serialized shape changes
pub const FORMAT_VERSION: u32 = 1;

/// How many ranked importances the report keeps
const TOP_IMPORTANCES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Outcome of one training run, stored inside the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_kind: ModelKind,
    pub train_size: usize,
    pub validation_size: usize,
    pub test_size: usize,
    pub feature_count: usize,
    pub vocabulary_size: usize,
    pub validation: EvaluationMetrics,
    pub test: EvaluationMetrics,
    pub overfitting: OverfittingCheck,

    /// Top forest importances, highest first; empty for linear models
    #[serde(default)]
    pub feature_importance: Vec<FeatureImportance>,

    /// Auxiliary columns the training data lacked
    #[serde(default)]
    pub missing_columns: Vec<String>,
}

/// Fitted extractor plus classifier. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    format_version: u32,
    trained_at: DateTime<Utc>,
    extractor: FeatureExtractor,
    classifier: ClassifierModel,
    report: TrainingReport,
}

impl TrainedModel {
    /// Load a labeled CSV and run [`TrainedModel::train`] on it
    pub fn train_from_csv(path: impl AsRef<Path>, options: &TrainingOptions) -> Result<Self> {
        let dataset = LabeledDataset::from_path(path)?;
        Self::train(&dataset, options)
    }

    /// Split, fit on the training partition, then score validation and test.
    ///
    /// Only training rows reach the vectorizer, scaler and classifier.
    pub fn train(dataset: &LabeledDataset, options: &TrainingOptions) -> Result<Self> {
        let split = DataSplit::stratified(
            &dataset.labels,
            options.test_fraction,
            options.val_fraction,
            options.seed,
        )?;

        let train_labels: Vec<bool> = split.train.iter().map(|&i| dataset.labels[i]).collect();
        let positives = train_labels.iter().filter(|&&y| y).count();
        if positives == 0 || positives == train_labels.len() {
            return Err(Error::dataset("training partition needs both classes"));
        }
        if split.validation.is_empty() || split.test.is_empty() {
            warn!(
                validation = split.validation.len(),
                test = split.test.len(),
                "Evaluation partition is empty; metrics will be zero"
            );
        }

        let train_records: Vec<&FeatureRecord> =
            split.train.iter().map(|&i| &dataset.records[i]).collect();
        let extractor = FeatureExtractor::fit(options.tfidf.clone(), &train_records)?;
        info!(
            train = split.train.len(),
            validation = split.validation.len(),
            test = split.test.len(),
            features = extractor.width(),
            vocabulary = extractor.vocabulary_size(),
            "Fitted feature extractor"
        );

        let train_rows: Vec<FeatureVector> =
            train_records.iter().map(|r| extractor.extract(r)).collect();
        let row_refs: Vec<&[f64]> = train_rows.iter().map(FeatureVector::as_slice).collect();

        let classifier = match options.model_kind {
            ModelKind::RandomForest => ClassifierModel::RandomForest(RandomForest::fit(
                &options.forest,
                &row_refs,
                &train_labels,
                options.seed,
            )?),
            ModelKind::Logistic => ClassifierModel::Logistic(LogisticRegression::fit(
                &options.logistic,
                &row_refs,
                &train_labels,
            )?),
        };
        info!(kind = %options.model_kind, "Fitted classifier");

        let evaluate = |indices: &[usize]| {
            let predicted: Vec<bool> = indices
                .iter()
                .map(|&i| {
                    let row = extractor.extract(&dataset.records[i]);
                    DistressPrediction::from_probability(classifier.predict_proba(row.as_slice()))
                        .is_distress
                })
                .collect();
            let actual: Vec<bool> = indices.iter().map(|&i| dataset.labels[i]).collect();
            EvaluationMetrics::compute(&predicted, &actual)
        };
        let validation = evaluate(&split.validation);
        let test = evaluate(&split.test);
        let overfitting = OverfittingCheck::compare(&validation, &test, options.overfit_tolerance);

        info!(%validation, "Validation metrics");
        info!(%test, "Test metrics");
        if overfitting.is_warning() {
            warn!(gap = overfitting.gap, "Validation and test accuracy diverge");
        }

        let feature_importance = classifier
            .feature_importances()
            .map(|importances| rank_importances(&extractor.feature_names(), importances))
            .unwrap_or_default();

        let report = TrainingReport {
            model_kind: options.model_kind,
            train_size: split.train.len(),
            validation_size: split.validation.len(),
            test_size: split.test.len(),
            feature_count: extractor.width(),
            vocabulary_size: extractor.vocabulary_size(),
            validation,
            test,
            overfitting,
            feature_importance,
            missing_columns: dataset.missing_columns.clone(),
        };

        Ok(Self {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            extractor,
            classifier,
            report,
        })
    }

    /// Score one message. Absent auxiliary columns count as zero.
    pub fn predict(&self, text: &str, aux: Option<&AuxFeatures>) -> DistressPrediction {
        let default_aux = AuxFeatures::default();
        let row = self
            .extractor
            .extract_parts(text, aux.unwrap_or(&default_aux));
        DistressPrediction::from_probability(self.classifier.predict_proba(row.as_slice()))
    }

    /// Feature row for `record`; exposed for inspection and benchmarks
    pub fn features(&self, record: &FeatureRecord) -> FeatureVector {
        self.extractor.extract(record)
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn kind(&self) -> ModelKind {
        self.classifier.kind()
    }

    /// Write the artifact next to `path` and rename it into place
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = temp_path(path);
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp, path)?;

        info!(path = %path.display(), "Saved distress model");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let model: Self = serde_json::from_reader(reader)?;

        if model.format_version != FORMAT_VERSION {
            return Err(Error::config(format!(
                "{} has artifact format {}, expected {FORMAT_VERSION}",
                path.display(),
                model.format_version
            )));
        }
        model
            .classifier
            .validate()
            .map_err(|e| Error::config(format!("{} is not a usable artifact: {e}", path.display())))?;

        info!(
            path = %path.display(),
            kind = %model.kind(),
            trained_at = %model.trained_at,
            test_accuracy = model.report.test.accuracy,
            "Loaded distress model"
        );
        Ok(model)
    }
}

impl DistressClassifier for TrainedModel {
    fn predict(&self, text: &str, aux: Option<&AuxFeatures>) -> Result<DistressPrediction> {
        Ok(TrainedModel::predict(self, text, aux))
    }

    fn name(&self) -> &str {
        self.classifier.kind().as_str()
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn rank_importances(names: &[String], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .filter(|(_, &imp)| imp > 0.0)
        .map(|(name, &importance)| FeatureImportance {
            feature: name.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked.truncate(TOP_IMPORTANCES);
    ranked
}
