//! Headless controller for the service request form.
//!
//! It owns what the browser page renders: field values, one error per field,
//! the submit button state and the outcome banner. Submissions go to the
//! `/api/submit` endpoint of the relay it is bound to.

mod error_message;
mod fields;

pub use error_message::{error_message, GENERIC_FAILURE_MESSAGE};
pub use fields::{one_month_range, Field, FormFields};

use crate::domain::{validate, SubmissionRequest, ValidationErrors};
use chrono::NaiveDate;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const SUCCESS_MESSAGE: &str = "Form submitted successfully!";
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded {
        message: String,
    },
    Failed {
        message: String,
    },
}

impl FormStatus {
    /// Text of the success or error banner, if one is shown.
    pub fn banner(&self) -> Option<&str> {
        match self {
            FormStatus::Succeeded { message } | FormStatus::Failed { message } => {
                Some(message.as_str())
            }
            FormStatus::Idle | FormStatus::Submitting => None,
        }
    }
}

/// How a call to [`SubmissionForm::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAttempt {
    /// Another submission from this form was still in flight.
    Ignored,
    /// Local validation failed; nothing was sent.
    Invalid,
    Succeeded,
    Failed,
}

pub struct SubmissionForm {
    http_client: Client,
    submit_url: String,
    state: Mutex<FormState>,
}

#[derive(Default)]
struct FormState {
    fields: FormFields,
    field_errors: HashMap<Field, String>,
    status: FormStatus,
    // Once a submit was attempted, every edit re-validates.
    attempted: bool,
}

impl FormState {
    fn edit(&mut self, field: Field, value: String) {
        self.fields.set(field, value);
        if self.status.banner().is_some() {
            self.status = FormStatus::Idle;
        }
        if self.attempted {
            self.revalidate();
        }
    }

    fn revalidate(&mut self) -> Option<SubmissionRequest> {
        match validate(&self.fields.to_raw()) {
            Ok(request) => {
                self.field_errors.clear();
                Some(request)
            }
            Err(errors) => {
                self.field_errors = first_issue_per_field(&errors);
                None
            }
        }
    }
}

fn first_issue_per_field(errors: &ValidationErrors) -> HashMap<Field, String> {
    let mut field_errors = HashMap::new();
    for issue in errors.issues() {
        if let Some(field) = issue.field().and_then(Field::from_key) {
            field_errors
                .entry(field)
                .or_insert_with(|| issue.message.clone());
        }
    }
    field_errors
}

impl SubmissionForm {
    /// `base_url` is the origin serving the relay, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http_client: Client, base_url: &str) -> Self {
        Self {
            http_client,
            submit_url: format!("{}/api/submit", base_url.trim_end_matches('/')),
            state: Mutex::new(FormState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fields(&self) -> FormFields {
        self.state().fields.clone()
    }

    pub fn field_error(&self, field: Field) -> Option<String> {
        self.state().field_errors.get(&field).cloned()
    }

    pub fn status(&self) -> FormStatus {
        self.state().status.clone()
    }

    pub fn submit_enabled(&self) -> bool {
        self.state().status != FormStatus::Submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submit_enabled() {
            "Submit"
        } else {
            "Submitting..."
        }
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        self.state().edit(field, value.into());
    }

    /// The "one month" checkbox. Checking it overwrites both dates with
    /// `today` and one calendar month later; unchecking leaves them alone.
    pub fn set_one_month(&self, checked: bool, today: NaiveDate) {
        if !checked {
            return;
        }
        if let Some((start, end)) = one_month_range(today) {
            let mut state = self.state();
            state.edit(Field::StartDate, fields::format_date(start));
            state.edit(Field::EndDate, fields::format_date(end));
        }
    }

    /// [`set_one_month`](Self::set_one_month) with the local calendar date.
    pub fn check_one_month(&self, checked: bool) {
        self.set_one_month(checked, chrono::Local::now().date_naive());
    }

    /// Validates locally and, if the fields are valid, posts them to the relay.
    ///
    /// Success clears every field; failure keeps them for correction. While a
    /// submission is in flight further calls return [`SubmitAttempt::Ignored`]
    /// without touching the network.
    #[tracing::instrument(name = "Submitting the service request form", skip(self))]
    pub async fn submit(&self) -> SubmitAttempt {
        let request = {
            let mut state = self.state();
            if state.status == FormStatus::Submitting {
                return SubmitAttempt::Ignored;
            }
            state.attempted = true;
            match state.revalidate() {
                Some(request) => {
                    state.status = FormStatus::Submitting;
                    request
                }
                None => {
                    state.status = FormStatus::Idle;
                    return SubmitAttempt::Invalid;
                }
            }
        };

        let outcome = self.send(&request).await;

        let mut state = self.state();
        match outcome {
            Ok(()) => {
                *state = FormState {
                    status: FormStatus::Succeeded {
                        message: SUCCESS_MESSAGE.to_string(),
                    },
                    ..FormState::default()
                };
                SubmitAttempt::Succeeded
            }
            Err(message) => {
                state.status = FormStatus::Failed { message };
                SubmitAttempt::Failed
            }
        }
    }

    /// `Err` carries the banner text.
    async fn send(&self, request: &SubmissionRequest) -> Result<(), String> {
        let response = self
            .http_client
            .post(&self.submit_url)
            .json(&SubmissionPayload::from(request))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error.cause_chain = ?e, "Failed to reach the submission endpoint");
                TRANSPORT_FAILURE_MESSAGE.to_string()
            })?;

        if response.status().is_success() {
            return Ok(());
        }
        // An unreadable or non-JSON body counts as `{}`.
        let text = response.text().await.unwrap_or_default();
        let result = serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({}));
        Err(error_message(&result))
    }
}

#[derive(serde::Serialize)]
struct SubmissionPayload<'a> {
    name: &'a str,
    phone: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    price: f64,
    service: &'a str,
    start_date: &'a str,
    end_date: &'a str,
}

impl<'a> From<&'a SubmissionRequest> for SubmissionPayload<'a> {
    fn from(request: &'a SubmissionRequest) -> Self {
        Self {
            name: request.name.as_ref(),
            phone: request.phone.as_ref(),
            email: request.email.as_ref(),
            notes: request.notes.as_deref(),
            price: request.price.value(),
            service: request.service.as_ref(),
            start_date: request.start_date.as_ref(),
            end_date: request.end_date.as_ref(),
        }
    }
}
