use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use super::encoding::{EncoderArtifactError, EncoderSet};
use super::model::{
    Classifier, ClassifierModel, FeatureLayout, FeatureLayoutError, ModelArtifactError,
};
use crate::config::ArtifactPaths;

/// Startup failure while reading the trained model or encoders.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {path} is invalid: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelArtifactError,
    },
    #[error("encoder artifact {path} is invalid: {source}")]
    Encoders {
        path: PathBuf,
        #[source]
        source: EncoderArtifactError,
    },
    #[error("model feature layout does not match the loan form: {0}")]
    Layout(#[from] FeatureLayoutError),
}

/// Classifier, encoders, and the resolved column order, shared read-only by all requests.
pub struct LoadedArtifacts {
    classifier: Arc<dyn Classifier>,
    encoders: EncoderSet,
    layout: FeatureLayout,
}

impl LoadedArtifacts {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        encoders: EncoderSet,
    ) -> Result<Self, ArtifactLoadError> {
        let layout = FeatureLayout::resolve(classifier.feature_names())?;
        Ok(Self {
            classifier,
            encoders,
            layout,
        })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }
}

impl std::fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("classifier", &self.classifier.name())
            .field("encoders", &self.encoders)
            .field("layout", &self.layout)
            .finish()
    }
}

/// Outcome of the one-shot startup load.
#[derive(Debug, Clone)]
pub enum Artifacts {
    Loaded(Arc<LoadedArtifacts>),
    Unavailable { reason: String },
}

impl Artifacts {
    /// Load both artifacts; any failure is logged and downgraded to `Unavailable`.
    pub fn load(paths: &ArtifactPaths) -> Self {
        match load_artifacts(paths) {
            Ok(loaded) => {
                info!(
                    model = %paths.model.display(),
                    encoders = %paths.encoders.display(),
                    classifier = loaded.classifier().name(),
                    "model and encoders loaded"
                );
                Artifacts::Loaded(Arc::new(loaded))
            }
            Err(err) => {
                error!(error = %err, "error loading model or encoders; predictions disabled");
                Artifacts::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn loaded(artifacts: LoadedArtifacts) -> Self {
        Artifacts::Loaded(Arc::new(artifacts))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Artifacts::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Artifacts::Loaded(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Artifacts::Loaded(_) => None,
            Artifacts::Unavailable { reason } => Some(reason),
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactLoadError> {
    std::fs::read(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_artifacts(paths: &ArtifactPaths) -> Result<LoadedArtifacts, ArtifactLoadError> {
    let model = ClassifierModel::from_json_slice(&read(&paths.model)?).map_err(|source| {
        ArtifactLoadError::Model {
            path: paths.model.clone(),
            source,
        }
    })?;
    let encoders = EncoderSet::from_json_slice(&read(&paths.encoders)?).map_err(|source| {
        ArtifactLoadError::Encoders {
            path: paths.encoders.clone(),
            source,
        }
    })?;
    LoadedArtifacts::new(Arc::new(model), encoders)
}
