use super::common::*;
use std::sync::Arc;

use crate::prediction::domain::{LoanField, LoanVerdict, PredictionStage};
use crate::prediction::encoding::EncodingError;
use crate::prediction::model::InferenceError;
use crate::prediction::notice::{Notice, NoticeLevel};
use crate::prediction::service::PredictionError;
use crate::prediction::validation::ValidationError;

#[test]
fn approves_when_model_outputs_one() {
    let (service, classifier) = build_service(1.0);

    let verdict = service.predict(&application_form()).expect("prediction runs");

    assert_eq!(verdict, LoanVerdict::Approved);
    assert_eq!(classifier.calls(), 1);
    assert_eq!(
        classifier.last_row(),
        Some(vec![5000.0, 0.0, 120.0, 360.0, 1.0, 2.0, 0.0, 0.0])
    );
    assert_eq!(
        service.respond(&application_form()),
        Notice::success("Loan Approved")
    );
}

#[test]
fn rejects_when_model_outputs_zero() {
    let (service, _) = build_service(0.0);

    let notice = service.respond(&application_form());

    assert_eq!(notice.level, NoticeLevel::Danger);
    assert_eq!(notice.message, "Loan Rejected");
}

#[test]
fn missing_field_stops_before_inference() {
    for field in LoanField::ALL {
        let (service, classifier) = build_service(1.0);
        let mut form = application_form();
        form.remove(field.name());

        let err = service.predict(&form).expect_err("missing field rejected");

        assert_eq!(
            err,
            PredictionError::Validation(ValidationError::MissingField(field))
        );
        assert_eq!(err.stage(), PredictionStage::Received);
        assert_eq!(
            err.notice(),
            Notice::danger(format!("Missing value for {}", field.name()))
        );
        assert_eq!(classifier.calls(), 0);
    }
}

#[test]
fn non_numeric_value_aborts_before_encoding() {
    let (service, classifier) = build_service(1.0);
    let mut form = application_form();
    form.insert("LoanAmount".to_string(), "abc".to_string());
    // An unseen category would fail encoding; coercion must fail first.
    form.insert("Property_Area".to_string(), "Suburban".to_string());

    let err = service.predict(&form).expect_err("coercion fails");

    assert!(matches!(err, PredictionError::Coercion(ref e) if e.field == LoanField::LoanAmount));
    assert_eq!(err.stage(), PredictionStage::Validated);
    assert!(err.notice().message.starts_with("Error during prediction:"));
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn unseen_category_skips_inference() {
    let (service, classifier) = build_service(1.0);
    let mut form = application_form();
    form.insert("Property_Area".to_string(), "Suburban".to_string());

    let err = service.predict(&form).expect_err("encoding fails");

    assert!(matches!(
        err,
        PredictionError::Encoding(EncodingError::UnknownCategory {
            field: LoanField::PropertyArea,
            ..
        })
    ));
    assert_eq!(err.stage(), PredictionStage::Coerced);
    assert!(err.notice().message.contains("Suburban"));
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn unavailable_artifacts_short_circuit_every_payload() {
    let service = unavailable_service();
    let mut invalid = application_form();
    invalid.clear();

    for form in [application_form(), invalid] {
        let err = service.predict(&form).expect_err("model unavailable");
        assert!(matches!(err, PredictionError::ModelUnavailable { .. }));
        assert_eq!(
            err.notice(),
            Notice::danger("Model or encoders not loaded properly.")
        );
    }
}

#[test]
fn model_failures_become_inference_errors() {
    let service = service_with(Arc::new(BrokenClassifier));

    let err = service.predict(&application_form()).expect_err("model fails");

    assert!(matches!(err, PredictionError::Inference(InferenceError::Model(_))));
    assert_eq!(err.stage(), PredictionStage::Encoded);
    assert_eq!(
        err.notice().message,
        "Error during prediction: shape mismatch in booster"
    );
}

#[test]
fn probability_outputs_are_not_silently_rejected() {
    let (service, _) = build_service(0.62);

    let err = service.predict(&application_form()).expect_err("non-binary label");

    assert_eq!(
        err,
        PredictionError::Inference(InferenceError::UnexpectedLabel(0.62))
    );
}

#[test]
fn identical_payloads_yield_identical_outcomes() {
    let (service, classifier) = build_service(1.0);

    let first = service.respond(&application_form());
    let second = service.respond(&application_form());

    assert_eq!(first, second);
    assert_eq!(classifier.calls(), 2);
}

#[test]
fn rows_follow_the_model_column_order() {
    let mut columns = LoanField::ALL.to_vec();
    columns.reverse();
    let classifier = Arc::new(StubClassifier::with_columns(1.0, &columns));
    let service = service_with(classifier.clone());

    service.predict(&application_form()).expect("prediction runs");

    assert_eq!(
        classifier.last_row(),
        Some(vec![0.0, 0.0, 2.0, 1.0, 360.0, 120.0, 0.0, 5000.0])
    );
}

#[test]
fn padded_category_is_not_silently_trimmed() {
    let (service, classifier) = build_service(1.0);
    let mut form = application_form();
    form.insert("Property_Area".to_string(), " Urban ".to_string());

    let err = service.predict(&form).expect_err("padded category rejected");

    assert!(matches!(
        err,
        PredictionError::Encoding(EncodingError::UnknownCategory {
            field: LoanField::PropertyArea,
            ref value,
            ..
        }) if value == " Urban "
    ));
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn padded_numbers_are_still_parsed() {
    let (service, _) = build_service(1.0);
    let mut form = application_form();
    form.insert("ApplicantIncome".to_string(), "  5000 ".to_string());

    assert_eq!(service.predict(&form), Ok(LoanVerdict::Approved));
}
