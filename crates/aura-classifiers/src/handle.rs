//! Shared, swappable reference to the current trained model

use crate::classifier::DistressClassifier;
use crate::detector::TrainedModel;
use crate::features::AuxFeatures;
use aura_core::{DistressPrediction, Error, Result};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Readers clone the inner `Arc` and never hold the lock while predicting.
/// Reloads build the new model first, then replace the pointer in one step.
#[derive(Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelHandle {
    /// Handle with no model; predictions fail with `ModelNotReady`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(model))),
        }
    }

    /// Load `path` if it exists. A missing or unreadable artifact leaves the
    /// handle empty rather than failing start-up.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "No distress model artifact; classifier disabled");
            return Self::empty();
        }
        match TrainedModel::load(path) {
            Ok(model) => Self::with_model(model),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load distress model; classifier disabled");
                Self::empty()
            }
        }
    }

    /// Replace the current model, returning the previous one
    pub fn install(&self, model: TrainedModel) -> Option<Arc<TrainedModel>> {
        self.current.write().replace(Arc::new(model))
    }

    /// Load `path` and swap it in. On error the old model stays active.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<Arc<TrainedModel>> {
        let model = Arc::new(TrainedModel::load(path.as_ref())?);
        *self.current.write() = Some(Arc::clone(&model));
        info!(path = %path.as_ref().display(), "Distress model reloaded");
        Ok(model)
    }

    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.current.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }
}

impl DistressClassifier for ModelHandle {
    fn predict(&self, text: &str, aux: Option<&AuxFeatures>) -> Result<DistressPrediction> {
        let model = self.current().ok_or(Error::ModelNotReady)?;
        Ok(model.predict(text, aux))
    }

    /// Kind of the model currently installed, or "unloaded"
    fn name(&self) -> &str {
        self.current
            .read()
            .as_ref()
            .map_or("unloaded", |model| model.kind().as_str())
    }
}
