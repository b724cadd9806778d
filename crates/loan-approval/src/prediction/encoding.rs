use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::domain::{excerpt, EncodedApplication, LoanApplication, LoanField};

/// Raised when a categorical value cannot be translated to its trained code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error(
        "{field} value '{}' was not seen during training (known: {known})",
        excerpt(.value)
    )]
    UnknownCategory {
        field: LoanField,
        value: String,
        known: String,
    },
    #[error("no encoder configured for {0}")]
    MissingEncoder(LoanField),
}

/// Structural problems found while building an encoder set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncoderSetError {
    #[error("encoder for {field} lists class '{class}' more than once")]
    DuplicateClass { field: String, class: String },
    #[error("encoder for {0} has no classes")]
    EmptyClasses(String),
    #[error("encoder set is missing an encoder for {0}")]
    MissingEncoder(LoanField),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncoderSpec {
    classes: Vec<String>,
}

/// Fitted label encoder: the code of a class is its position in `classes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl CategoryEncoder {
    pub fn new<I, S>(field: &str, classes: I) -> Result<Self, EncoderSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(EncoderSetError::EmptyClasses(field.to_string()));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code).is_some() {
                return Err(EncoderSetError::DuplicateClass {
                    field: field.to_string(),
                    class: class.clone(),
                });
            }
        }

        Ok(Self { classes, codes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, value: &str) -> Option<usize> {
        self.codes.get(value).copied()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

/// Immutable mapping from categorical field name to its fitted encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSet {
    encoders: BTreeMap<String, CategoryEncoder>,
}

impl EncoderSet {
    /// Build a set, checking that every categorical loan field is covered.
    pub fn new(encoders: BTreeMap<String, CategoryEncoder>) -> Result<Self, EncoderSetError> {
        if let Some(missing) = LoanField::CATEGORICAL
            .into_iter()
            .find(|field| !encoders.contains_key(field.name()))
        {
            return Err(EncoderSetError::MissingEncoder(missing));
        }
        Ok(Self { encoders })
    }

    /// Parse the JSON artifact: `{"<field>": {"classes": ["..", ..]}, ..}`.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, EncoderArtifactError> {
        let specs: BTreeMap<String, EncoderSpec> = serde_json::from_slice(bytes)?;
        let mut encoders = BTreeMap::new();
        for (field, spec) in specs {
            let encoder = CategoryEncoder::new(&field, spec.classes)?;
            encoders.insert(field, encoder);
        }
        Ok(Self::new(encoders)?)
    }

    pub fn get(&self, field: LoanField) -> Option<&CategoryEncoder> {
        self.encoders.get(field.name())
    }

    /// Translate one categorical value, failing on anything the encoder never saw.
    pub fn encode(&self, field: LoanField, value: &str) -> Result<f64, EncodingError> {
        let encoder = self.get(field).ok_or(EncodingError::MissingEncoder(field))?;
        encoder
            .encode(value)
            .map(|code| code as f64)
            .ok_or_else(|| EncodingError::UnknownCategory {
                field,
                value: value.to_string(),
                known: encoder.classes().join(", "),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncoderArtifactError {
    #[error("malformed encoder artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] EncoderSetError),
}

/// Replace each categorical value with its code, producing an all-numeric record.
pub fn encode_application(
    application: &LoanApplication,
    encoders: &EncoderSet,
) -> Result<EncodedApplication, EncodingError> {
    let mut values = BTreeMap::new();
    for field in LoanField::NUMERIC {
        if let Some(value) = application.numeric(field) {
            values.insert(field, value);
        }
    }
    for field in LoanField::CATEGORICAL {
        let raw = application.categorical(field).unwrap_or_default();
        values.insert(field, encoders.encode(field, raw)?);
    }
    Ok(EncodedApplication::new(values))
}
