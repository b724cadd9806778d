//! Loan application intake and verdict service.
//!
//! The [`prediction`] module owns the request pipeline: form validation, numeric coercion,
//! categorical encoding, classifier inference, and the one-shot notice rendered back to the
//! applicant. Configuration and tracing setup follow the service conventions in [`config`]
//! and [`telemetry`].

pub mod config;
pub mod error;
pub mod prediction;
pub mod telemetry;
