use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap, HeaderName},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use maud::{html, Markup, DOCTYPE};
use tracing::warn;

use super::domain::LoanField;
use super::notice::{Notice, NoticeSigner, CLEAR_NOTICE_COOKIE};
use super::service::LoanPredictionService;

#[derive(Clone)]
pub(crate) struct PredictionState {
    service: Arc<LoanPredictionService>,
    notices: NoticeSigner,
}

/// Router serving the loan form and the prediction endpoint.
pub fn prediction_router(service: Arc<LoanPredictionService>, notices: NoticeSigner) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/predict", post(predict_handler))
        .with_state(PredictionState { service, notices })
}

pub(crate) async fn home_handler(
    State(state): State<PredictionState>,
    headers: HeaderMap,
) -> (AppendHeaders<Vec<(HeaderName, &'static str)>>, Markup) {
    let pending = state.notices.take(&headers);
    let clear = match pending {
        Some(_) => vec![(header::SET_COOKIE, CLEAR_NOTICE_COOKIE)],
        None => Vec::new(),
    };
    let notice = pending.flatten();
    (AppendHeaders(clear), render_home(notice.as_ref()))
}

pub(crate) async fn predict_handler(
    State(state): State<PredictionState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    let notice = match form {
        Ok(Form(fields)) => state.service.respond(&fields),
        Err(rejection) => {
            warn!(error = %rejection, "unreadable loan form submission");
            Notice::danger(format!(
                "Error during prediction: {}",
                rejection.body_text()
            ))
        }
    };

    (
        [(header::SET_COOKIE, state.notices.set_cookie(&notice))],
        Redirect::to("/"),
    )
        .into_response()
}

fn render_home(notice: Option<&Notice>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Loan Approval Prediction" }
            }
            body {
                h1 { "Loan Approval Prediction" }
                @if let Some(notice) = notice {
                    div class={ "notice notice-" (notice.level.label()) } role="status" {
                        (notice.message)
                    }
                }
                form method="post" action="/predict" {
                    @for field in LoanField::ALL {
                        (render_input(field))
                    }
                    button type="submit" { "Predict" }
                }
            }
        }
    }
}

fn render_input(field: LoanField) -> Markup {
    let name = field.name();
    let options: &[&str] = match field {
        LoanField::PropertyArea => &["Urban", "Semiurban", "Rural"],
        LoanField::Education => &["Graduate", "Not Graduate"],
        LoanField::SelfEmployed => &["No", "Yes"],
        LoanField::CreditHistory => &["1", "0"],
        _ => &[],
    };
    html! {
        p {
            label for=(name) { (field.label()) }
            " "
            @if options.is_empty() {
                input type="number" step="any" id=(name) name=(name) required;
            } @else {
                select id=(name) name=(name) required {
                    @for choice in options {
                        option value=(choice) { (choice) }
                    }
                }
            }
        }
    }
}
