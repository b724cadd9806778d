//! Loan prediction pipeline: form validation, numeric coercion, categorical encoding,
//! classifier inference, and the notice shown back to the applicant.
//!
//! The classifier and encoders are loaded once at startup by [`Artifacts::load`]; a failed
//! load leaves the service running in an explicit `Unavailable` state so every submission
//! receives an informative notice instead of a crash.

pub mod artifacts;
pub mod domain;
pub mod encoding;
pub mod model;
pub mod notice;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactLoadError, Artifacts, LoadedArtifacts};
pub use domain::{
    EncodedApplication, LoanApplication, LoanField, LoanVerdict, PredictionStage,
    RawLoanApplication,
};
pub use encoding::{CategoryEncoder, EncoderSet, EncodingError};
pub use model::{Classifier, ClassifierModel, FeatureLayout, InferenceError};
pub use notice::{Notice, NoticeLevel, NoticeSigner, NOTICE_COOKIE};
pub use router::prediction_router;
pub use service::{LoanPredictionService, PredictionError};
pub use validation::{CoercionError, ValidationError};
