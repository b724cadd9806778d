use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::prediction::artifacts::{Artifacts, LoadedArtifacts};
use crate::prediction::domain::LoanField;
use crate::prediction::encoding::{CategoryEncoder, EncoderSet};
use crate::prediction::model::{Classifier, InferenceError};
use crate::prediction::service::LoanPredictionService;

pub(super) const SECRET: &str = "test-secret";

/// Classifier double returning a fixed label and recording every row it sees.
pub(super) struct StubClassifier {
    label: f64,
    feature_names: Vec<String>,
    calls: AtomicUsize,
    rows: Mutex<Vec<Vec<f64>>>,
}

impl StubClassifier {
    pub(super) fn returning(label: f64) -> Self {
        Self::with_columns(label, &LoanField::ALL)
    }

    pub(super) fn with_columns(label: f64, columns: &[LoanField]) -> Self {
        Self {
            label,
            feature_names: columns.iter().map(|f| f.name().to_string()).collect(),
            calls: AtomicUsize::new(0),
            rows: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn last_row(&self) -> Option<Vec<f64>> {
        self.rows.lock().expect("rows mutex poisoned").last().cloned()
    }
}

impl Classifier for StubClassifier {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> Result<f64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .push(row.to_vec());
        Ok(self.label)
    }
}

/// Classifier double that always fails inside the model.
pub(super) struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn feature_names(&self) -> &[String] {
        &[]
    }

    fn predict(&self, _row: &[f64]) -> Result<f64, InferenceError> {
        Err(InferenceError::Model("shape mismatch in booster".to_string()))
    }
}

pub(super) fn encoders() -> EncoderSet {
    let mut encoders = BTreeMap::new();
    encoders.insert(
        "Property_Area".to_string(),
        CategoryEncoder::new("Property_Area", ["Rural", "Semiurban", "Urban"]).expect("valid"),
    );
    encoders.insert(
        "Education".to_string(),
        CategoryEncoder::new("Education", ["Graduate", "Not Graduate"]).expect("valid"),
    );
    encoders.insert(
        "Self_Employed".to_string(),
        CategoryEncoder::new("Self_Employed", ["No", "Yes"]).expect("valid"),
    );
    EncoderSet::new(encoders).expect("complete encoder set")
}

pub(super) fn application_form() -> HashMap<String, String> {
    [
        ("ApplicantIncome", "5000"),
        ("CoapplicantIncome", "0"),
        ("LoanAmount", "120"),
        ("Loan_Amount_Term", "360"),
        ("Credit_History", "1"),
        ("Property_Area", "Urban"),
        ("Education", "Graduate"),
        ("Self_Employed", "No"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

pub(super) fn service_with<C>(classifier: Arc<C>) -> Arc<LoanPredictionService>
where
    C: Classifier + 'static,
{
    let loaded = LoadedArtifacts::new(classifier, encoders()).expect("layout resolves");
    Arc::new(LoanPredictionService::new(Artifacts::loaded(loaded)))
}

pub(super) fn build_service(label: f64) -> (Arc<LoanPredictionService>, Arc<StubClassifier>) {
    let classifier = Arc::new(StubClassifier::returning(label));
    (service_with(classifier.clone()), classifier)
}

pub(super) fn unavailable_service() -> Arc<LoanPredictionService> {
    Arc::new(LoanPredictionService::new(Artifacts::unavailable(
        "unable to read loan_model.json: No such file or directory (os error 2)",
    )))
}
