use std::collections::{BTreeMap, HashMap};

use super::domain::{excerpt, LoanApplication, LoanField, RawLoanApplication};

/// Raised when a required form field is absent or blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing value for {0}")]
    MissingField(LoanField),
}

/// Raised when a numeric field does not hold a finite number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not convert {field} value '{}' to a number", excerpt(.value))]
pub struct CoercionError {
    pub field: LoanField,
    pub value: String,
}

/// Check the eight required fields in canonical order, stopping at the first gap.
/// Values are stored as submitted; whitespace only matters for the blank check.
pub fn validate_form(
    form: &HashMap<String, String>,
) -> Result<RawLoanApplication, ValidationError> {
    let mut values = BTreeMap::new();
    for field in LoanField::ALL {
        let value = form
            .get(field.name())
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(ValidationError::MissingField(field))?;
        values.insert(field, value.clone());
    }
    Ok(RawLoanApplication::new(values))
}

/// Parse the numeric fields; categorical fields pass through untouched.
pub fn coerce(raw: &RawLoanApplication) -> Result<LoanApplication, CoercionError> {
    let number = |field: LoanField| -> Result<f64, CoercionError> {
        let value = raw.get(field);
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .ok_or_else(|| CoercionError {
                field,
                value: value.to_string(),
            })
    };

    Ok(LoanApplication {
        applicant_income: number(LoanField::ApplicantIncome)?,
        coapplicant_income: number(LoanField::CoapplicantIncome)?,
        loan_amount: number(LoanField::LoanAmount)?,
        loan_amount_term: number(LoanField::LoanAmountTerm)?,
        credit_history: number(LoanField::CreditHistory)?,
        property_area: raw.get(LoanField::PropertyArea).to_string(),
        education: raw.get(LoanField::Education).to_string(),
        self_employed: raw.get(LoanField::SelfEmployed).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> HashMap<String, String> {
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
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn each_missing_field_is_reported_by_name() {
        for field in LoanField::ALL {
            let mut form = complete_form();
            form.remove(field.name());
            let err = validate_form(&form).expect_err("missing field rejected");
            assert_eq!(err, ValidationError::MissingField(field));
            assert_eq!(err.to_string(), format!("Missing value for {}", field.name()));
        }
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let mut form = complete_form();
        form.insert("Education".to_string(), "   \t".to_string());
        let err = validate_form(&form).expect_err("blank field rejected");
        assert_eq!(err, ValidationError::MissingField(LoanField::Education));
    }

    #[test]
    fn reports_first_missing_field_in_canonical_order() {
        let mut form = complete_form();
        form.remove("Self_Employed");
        form.remove("LoanAmount");
        let err = validate_form(&form).expect_err("missing fields rejected");
        assert_eq!(err, ValidationError::MissingField(LoanField::LoanAmount));
    }

    #[test]
    fn coerces_numeric_fields_and_keeps_categories() {
        let raw = validate_form(&complete_form()).expect("form validates");
        let application = coerce(&raw).expect("numbers parse");
        assert_eq!(application.applicant_income, 5000.0);
        assert_eq!(application.loan_amount_term, 360.0);
        assert_eq!(application.property_area, "Urban");
        assert_eq!(application.self_employed, "No");
    }

    #[test]
    fn values_are_trimmed_before_coercion() {
        let mut form = complete_form();
        form.insert("LoanAmount".to_string(), " 120.5 ".to_string());
        let raw = validate_form(&form).expect("form validates");
        let application = coerce(&raw).expect("numbers parse");
        assert_eq!(application.loan_amount, 120.5);
    }

    #[test]
    fn categorical_values_are_kept_as_submitted() {
        let mut form = complete_form();
        form.insert("Property_Area".to_string(), " Urban ".to_string());
        let raw = validate_form(&form).expect("form validates");
        let application = coerce(&raw).expect("numbers parse");
        assert_eq!(application.property_area, " Urban ");
    }

    #[test]
    fn long_values_are_shortened_in_messages() {
        let mut form = complete_form();
        form.insert("LoanAmount".to_string(), "x".repeat(3000));
        let raw = validate_form(&form).expect("form validates");
        let err = coerce(&raw).expect_err("non-numeric rejected");
        assert_eq!(err.value.len(), 3000);
        assert!(err.to_string().len() < 200);
    }

    #[test]
    fn non_numeric_values_fail_coercion() {
        for field in LoanField::NUMERIC {
            for bad in ["abc", "NaN", "inf"] {
                let mut form = complete_form();
                form.insert(field.name().to_string(), bad.to_string());
                let raw = validate_form(&form).expect("form validates");
                let err = coerce(&raw).expect_err("non-numeric rejected");
                assert_eq!(err.field, field);
                assert_eq!(err.value, bad);
            }
        }
    }
}
