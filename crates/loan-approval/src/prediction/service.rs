use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::artifacts::Artifacts;
use super::domain::{LoanVerdict, PredictionStage};
use super::encoding::{encode_application, EncodingError};
use super::model::{interpret_label, InferenceError};
use super::notice::Notice;
use super::validation::{coerce, validate_form, CoercionError, ValidationError};

/// Any failure along the request pipeline. Each variant is absorbing: later stages never run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("Model or encoders not loaded properly.")]
    ModelUnavailable { reason: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl PredictionError {
    /// Last stage the request completed before failing.
    pub fn stage(&self) -> PredictionStage {
        match self {
            PredictionError::ModelUnavailable { .. } | PredictionError::Validation(_) => {
                PredictionStage::Received
            }
            PredictionError::Coercion(_) => PredictionStage::Validated,
            PredictionError::Encoding(_) => PredictionStage::Coerced,
            PredictionError::Inference(_) => PredictionStage::Encoded,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            PredictionError::ModelUnavailable { .. } => "artifact_load",
            PredictionError::Validation(_) => "validation",
            PredictionError::Coercion(_) => "coercion",
            PredictionError::Encoding(_) => "encoding",
            PredictionError::Inference(_) => "inference",
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            PredictionError::ModelUnavailable { .. } | PredictionError::Validation(_) => {
                Notice::danger(self.to_string())
            }
            other => Notice::danger(format!("Error during prediction: {other}")),
        }
    }
}

/// Orchestrates validation, coercion, encoding, and inference over the loaded artifacts.
#[derive(Debug, Clone)]
pub struct LoanPredictionService {
    artifacts: Artifacts,
}

impl LoanPredictionService {
    pub fn new(artifacts: Artifacts) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Run one submission through the pipeline.
    pub fn predict(
        &self,
        form: &HashMap<String, String>,
    ) -> Result<LoanVerdict, PredictionError> {
        let loaded = match &self.artifacts {
            Artifacts::Loaded(loaded) => loaded,
            Artifacts::Unavailable { reason } => {
                return Err(PredictionError::ModelUnavailable {
                    reason: reason.clone(),
                })
            }
        };

        let raw = validate_form(form)?;
        let application = coerce(&raw)?;
        let encoded = encode_application(&application, loaded.encoders())?;
        let row = loaded.layout().row(&encoded);
        debug!(
            stage = PredictionStage::Encoded.label(),
            ?row,
            "feature row assembled"
        );

        let label = loaded.classifier().predict(&row)?;
        Ok(interpret_label(label)?)
    }

    /// Request boundary: every outcome becomes a notice, failures included.
    pub fn respond(&self, form: &HashMap<String, String>) -> Notice {
        match self.predict(form) {
            Ok(verdict) => {
                info!(
                    verdict = verdict.label(),
                    stage = PredictionStage::Presented.label(),
                    "loan prediction rendered"
                );
                Notice::from(verdict)
            }
            Err(err) => {
                warn!(
                    category = err.category(),
                    stage = err.stage().label(),
                    error = %err,
                    "loan prediction failed"
                );
                err.notice()
            }
        }
    }
}
