//! Distress classifier trait

use crate::features::AuxFeatures;
use aura_core::{DistressPrediction, Result};

/// Anything that can score a message for distress.
///
/// Implementations are CPU-bound and cheap enough to call inline on the
/// request path, so the trait is synchronous.
pub trait DistressClassifier: Send + Sync {
    /// Score `text`, using the auxiliary numeric columns when the caller has them
    fn predict(&self, text: &str, aux: Option<&AuxFeatures>) -> Result<DistressPrediction>;

    /// Get the classifier name
    fn name(&self) -> &str;
}
