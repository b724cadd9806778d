use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Form fields collected for every loan application, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoanField {
    #[serde(rename = "ApplicantIncome")]
    ApplicantIncome,
    #[serde(rename = "CoapplicantIncome")]
    CoapplicantIncome,
    #[serde(rename = "LoanAmount")]
    LoanAmount,
    #[serde(rename = "Loan_Amount_Term")]
    LoanAmountTerm,
    #[serde(rename = "Credit_History")]
    CreditHistory,
    #[serde(rename = "Property_Area")]
    PropertyArea,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Self_Employed")]
    SelfEmployed,
}

impl LoanField {
    pub const ALL: [LoanField; 8] = [
        LoanField::ApplicantIncome,
        LoanField::CoapplicantIncome,
        LoanField::LoanAmount,
        LoanField::LoanAmountTerm,
        LoanField::CreditHistory,
        LoanField::PropertyArea,
        LoanField::Education,
        LoanField::SelfEmployed,
    ];

    pub const NUMERIC: [LoanField; 5] = [
        LoanField::ApplicantIncome,
        LoanField::CoapplicantIncome,
        LoanField::LoanAmount,
        LoanField::LoanAmountTerm,
        LoanField::CreditHistory,
    ];

    pub const CATEGORICAL: [LoanField; 3] = [
        LoanField::PropertyArea,
        LoanField::Education,
        LoanField::SelfEmployed,
    ];

    /// Wire name used by the form and by the trained artifacts.
    pub fn name(self) -> &'static str {
        match self {
            LoanField::ApplicantIncome => "ApplicantIncome",
            LoanField::CoapplicantIncome => "CoapplicantIncome",
            LoanField::LoanAmount => "LoanAmount",
            LoanField::LoanAmountTerm => "Loan_Amount_Term",
            LoanField::CreditHistory => "Credit_History",
            LoanField::PropertyArea => "Property_Area",
            LoanField::Education => "Education",
            LoanField::SelfEmployed => "Self_Employed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn is_categorical(self) -> bool {
        Self::CATEGORICAL.contains(&self)
    }

    /// Human label shown next to the form input.
    pub fn label(self) -> &'static str {
        match self {
            LoanField::ApplicantIncome => "Applicant income",
            LoanField::CoapplicantIncome => "Co-applicant income",
            LoanField::LoanAmount => "Loan amount",
            LoanField::LoanAmountTerm => "Loan amount term",
            LoanField::CreditHistory => "Credit history",
            LoanField::PropertyArea => "Property area",
            LoanField::Education => "Education",
            LoanField::SelfEmployed => "Self employed",
        }
    }
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const EXCERPT_CHARS: usize = 64;

/// Shorten a submitted value for inclusion in user-facing messages.
pub(crate) fn excerpt(value: &str) -> String {
    match value.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", &value[..cut]),
        None => value.to_string(),
    }
}

/// Validated but still untyped submission: every field present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLoanApplication {
    values: BTreeMap<LoanField, String>,
}

impl RawLoanApplication {
    pub(crate) fn new(values: BTreeMap<LoanField, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, field: LoanField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }
}

/// Typed loan application after numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_amount_term: f64,
    pub credit_history: f64,
    pub property_area: String,
    pub education: String,
    pub self_employed: String,
}

impl LoanApplication {
    pub fn numeric(&self, field: LoanField) -> Option<f64> {
        match field {
            LoanField::ApplicantIncome => Some(self.applicant_income),
            LoanField::CoapplicantIncome => Some(self.coapplicant_income),
            LoanField::LoanAmount => Some(self.loan_amount),
            LoanField::LoanAmountTerm => Some(self.loan_amount_term),
            LoanField::CreditHistory => Some(self.credit_history),
            _ => None,
        }
    }

    pub fn categorical(&self, field: LoanField) -> Option<&str> {
        match field {
            LoanField::PropertyArea => Some(&self.property_area),
            LoanField::Education => Some(&self.education),
            LoanField::SelfEmployed => Some(&self.self_employed),
            _ => None,
        }
    }
}

/// Fully numeric application, ready to be laid out as a feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedApplication {
    values: BTreeMap<LoanField, f64>,
}

impl EncodedApplication {
    pub(crate) fn new(values: BTreeMap<LoanField, f64>) -> Self {
        Self { values }
    }

    pub fn value(&self, field: LoanField) -> f64 {
        self.values.get(&field).copied().unwrap_or(f64::NAN)
    }
}

/// Binary classifier outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanVerdict {
    Approved,
    Rejected,
}

impl LoanVerdict {
    pub fn label(self) -> &'static str {
        match self {
            LoanVerdict::Approved => "approved",
            LoanVerdict::Rejected => "rejected",
        }
    }
}

/// Steps of a single prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStage {
    Received,
    Validated,
    Coerced,
    Encoded,
    Inferred,
    Presented,
}

impl PredictionStage {
    pub fn label(self) -> &'static str {
        match self {
            PredictionStage::Received => "received",
            PredictionStage::Validated => "validated",
            PredictionStage::Coerced => "coerced",
            PredictionStage::Encoded => "encoded",
            PredictionStage::Inferred => "inferred",
            PredictionStage::Presented => "presented",
        }
    }
}
