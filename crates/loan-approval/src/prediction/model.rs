use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{EncodedApplication, LoanField, LoanVerdict};

/// Contract for externally trained binary classifiers.
///
/// `predict` receives one row laid out in `feature_names` order and returns the raw label.
/// Implementations must be pure: the same row always yields the same label.
pub trait Classifier: Send + Sync {
    /// Column order the model was trained on. Empty means the canonical field order.
    fn feature_names(&self) -> &[String];

    fn predict(&self, row: &[f64]) -> Result<f64, InferenceError>;

    fn name(&self) -> &str {
        "classifier"
    }
}

/// Failures raised while running the classifier or reading its output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("model expects {expected} features but received {found}")]
    RowWidth { expected: usize, found: usize },
    #[error("model produced a non-finite value")]
    NonFinite,
    #[error("decision tree references missing node {0}")]
    MalformedTree(usize),
    #[error("model returned {0}, expected a binary label of 0 or 1")]
    UnexpectedLabel(f64),
    #[error("{0}")]
    Model(String),
}

/// Map the raw classifier output onto a verdict. Only exact 0 and 1 are accepted.
pub fn interpret_label(label: f64) -> Result<LoanVerdict, InferenceError> {
    if label == 1.0 {
        Ok(LoanVerdict::Approved)
    } else if label == 0.0 {
        Ok(LoanVerdict::Rejected)
    } else {
        Err(InferenceError::UnexpectedLabel(label))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureLayoutError {
    #[error("model feature '{0}' is not a loan application field")]
    UnknownFeature(String),
    #[error("model lists feature '{0}' more than once")]
    DuplicateFeature(String),
    #[error("model does not use required feature {0}")]
    MissingFeature(LoanField),
}

/// Column order a classifier was trained on, resolved against the loan fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    columns: Vec<LoanField>,
}

impl FeatureLayout {
    pub fn canonical() -> Self {
        Self {
            columns: LoanField::ALL.to_vec(),
        }
    }

    /// Resolve declared feature names; every loan field must appear exactly once.
    pub fn resolve(names: &[String]) -> Result<Self, FeatureLayoutError> {
        if names.is_empty() {
            return Ok(Self::canonical());
        }

        let mut seen = BTreeSet::new();
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let field = LoanField::from_name(name)
                .ok_or_else(|| FeatureLayoutError::UnknownFeature(name.clone()))?;
            if !seen.insert(field) {
                return Err(FeatureLayoutError::DuplicateFeature(name.clone()));
            }
            columns.push(field);
        }

        if let Some(missing) = LoanField::ALL.into_iter().find(|f| !seen.contains(f)) {
            return Err(FeatureLayoutError::MissingFeature(missing));
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[LoanField] {
        &self.columns
    }

    pub fn row(&self, encoded: &EncodedApplication) -> Vec<f64> {
        self.columns.iter().map(|field| encoded.value(*field)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelArtifactError {
    #[error("malformed model artifact: {0}")]
    Parse(String),
    #[error("{what} has {found} entries but the model declares {expected} features")]
    WidthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("decision threshold {0} must lie strictly between 0 and 1")]
    InvalidThreshold(f64),
    #[error("decision tree has no nodes")]
    EmptyTree,
    #[error("decision tree node {node} points at missing {target}")]
    DanglingReference { node: usize, target: usize },
    #[error("decision tree node {node} splits on feature {feature} outside the declared columns")]
    FeatureOutOfRange { node: usize, feature: usize },
}

fn default_threshold() -> f64 {
    0.5
}

/// Linear model with a logistic link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticRegression {
    fn check(&self) -> Result<(), ModelArtifactError> {
        let expected = declared_width(&self.feature_names);
        if self.coefficients.len() != expected {
            return Err(ModelArtifactError::WidthMismatch {
                what: "coefficients",
                expected,
                found: self.coefficients.len(),
            });
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ModelArtifactError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    pub fn probability(&self, row: &[f64]) -> Result<f64, InferenceError> {
        if row.len() != self.coefficients.len() {
            return Err(InferenceError::RowWidth {
                expected: self.coefficients.len(),
                found: row.len(),
            });
        }
        let margin: f64 = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;
        let probability = 1.0 / (1.0 + (-margin).exp());
        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(InferenceError::NonFinite)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Binary decision tree; node 0 is the root and rows go left when `x <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn check(&self) -> Result<(), ModelArtifactError> {
        if self.nodes.is_empty() {
            return Err(ModelArtifactError::EmptyTree);
        }
        let width = declared_width(&self.feature_names);
        for (node, entry) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = entry
            {
                if *feature >= width {
                    return Err(ModelArtifactError::FeatureOutOfRange {
                        node,
                        feature: *feature,
                    });
                }
                for target in [*left, *right] {
                    if target >= self.nodes.len() {
                        return Err(ModelArtifactError::DanglingReference { node, target });
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_for(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let mut index = 0;
        // A well-formed tree visits each node at most once per row.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().ok_or(InferenceError::RowWidth {
                        expected: feature + 1,
                        found: row.len(),
                    })?;
                    if !value.is_finite() {
                        return Err(InferenceError::NonFinite);
                    }
                    index = if value <= *threshold { *left } else { *right };
                }
                None => return Err(InferenceError::MalformedTree(index)),
            }
        }
        Err(InferenceError::Model(
            "decision tree traversal did not terminate".to_string(),
        ))
    }
}

fn declared_width(names: &[String]) -> usize {
    if names.is_empty() {
        LoanField::ALL.len()
    } else {
        names.len()
    }
}

/// Classifier formats understood by the artifact loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
}

impl ClassifierModel {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelArtifactError> {
        let model: ClassifierModel = serde_json::from_slice(bytes)
            .map_err(|err| ModelArtifactError::Parse(err.to_string()))?;
        match &model {
            ClassifierModel::LogisticRegression(inner) => inner.check()?,
            ClassifierModel::DecisionTree(inner) => inner.check()?,
        }
        Ok(model)
    }
}

impl Classifier for ClassifierModel {
    fn feature_names(&self) -> &[String] {
        match self {
            ClassifierModel::LogisticRegression(inner) => &inner.feature_names,
            ClassifierModel::DecisionTree(inner) => &inner.feature_names,
        }
    }

    fn predict(&self, row: &[f64]) -> Result<f64, InferenceError> {
        match self {
            ClassifierModel::LogisticRegression(inner) => {
                let probability = inner.probability(row)?;
                Ok(if probability >= inner.threshold { 1.0 } else { 0.0 })
            }
            ClassifierModel::DecisionTree(inner) => inner.leaf_for(row),
        }
    }

    fn name(&self) -> &str {
        match self {
            ClassifierModel::LogisticRegression(_) => "logistic_regression",
            ClassifierModel::DecisionTree(_) => "decision_tree",
        }
    }
}
