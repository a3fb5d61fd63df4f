//! Labeled training data loaded from CSV

use crate::features::{AuxFeatures, FeatureRecord};
use aura_core::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const TEXT_COLUMN: &str = "text";
const LABEL_COLUMN: &str = "label";

/// Rows with a binary distress label
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub records: Vec<FeatureRecord>,
    pub labels: Vec<bool>,

    /// Auxiliary columns absent from the file; they are zero for every row
    pub missing_columns: Vec<String>,
}

impl LabeledDataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| Error::dataset(format!("cannot open {}: {e}", path.display())))?;
        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            distress = dataset.positive_count(),
            "Loaded labeled dataset"
        );
        Ok(dataset)
    }

    /// Parse CSV with a header row containing at least `text` and `label`
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv
            .headers()
            .map_err(|e| Error::dataset(format!("unreadable header row: {e}")))?
            .clone();

        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let text_idx = column(TEXT_COLUMN)
            .ok_or_else(|| Error::dataset("missing required column 'text'"))?;
        let label_idx = column(LABEL_COLUMN)
            .ok_or_else(|| Error::dataset("missing required column 'label'"))?;

        let mut aux_columns = Vec::new();
        let mut missing_columns = Vec::new();
        for name in AuxFeatures::names() {
            match column(name) {
                Some(idx) => aux_columns.push((name, idx)),
                None => missing_columns.push(name.to_string()),
            }
        }
        if !missing_columns.is_empty() {
            warn!(
                missing = missing_columns.len(),
                first = %missing_columns.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
                "Auxiliary feature columns missing; they default to 0.0"
            );
        }

        let mut records = Vec::new();
        let mut labels = Vec::new();
        for (line, row) in csv.records().enumerate() {
            let row = row.map_err(|e| Error::dataset(format!("row {}: {e}", line + 2)))?;

            let label_field = row.get(label_idx).unwrap_or("");
            let label = parse_label(label_field).ok_or_else(|| {
                Error::dataset(format!("row {}: invalid label '{label_field}'", line + 2))
            })?;

            let mut aux = AuxFeatures::default();
            for (name, idx) in &aux_columns {
                let value = row
                    .get(*idx)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .unwrap_or(0.0);
                aux.set(name, value);
            }

            records.push(FeatureRecord::new(row.get(text_idx).unwrap_or("")).with_aux(aux));
            labels.push(label);
        }

        if records.is_empty() {
            return Err(Error::dataset("dataset contains no rows"));
        }

        Ok(Self {
            records,
            labels,
            missing_columns,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&y| y).count()
    }
}

fn parse_label(field: &str) -> Option<bool> {
    match field.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "distress" => Some(true),
        "0" | "0.0" | "false" | "non-distress" | "none" => Some(false),
        _ => None,
    }
}
