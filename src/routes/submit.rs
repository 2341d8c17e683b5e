use crate::domain::{validate, ValidationErrors};
use crate::routes::error_chain_fmt;
use crate::webhook_client::{WebhookClient, WebhookResponse};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use futures_util::StreamExt;
use std::fmt::{Debug, Formatter};

/// Largest request body the relay accepts, in bytes.
pub const MAX_BODY_SIZE: usize = 256 * 1024;

/// The only response shape `/api/submit` ever returns, whatever the webhook did.
#[derive(Debug, serde::Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl Envelope {
    pub fn accepted(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn invalid(errors: ValidationErrors) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            errors: Some(errors),
        }
    }
}

#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("The submission failed validation")]
    ValidationError(#[from] ValidationErrors),
    #[error("Failed to reach the webhook endpoint")]
    NetworkError(#[source] reqwest::Error),
    #[error("The webhook rejected the submission ({status}): {message}")]
    RejectedError { status: u16, message: String },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubmitError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubmitError::RejectedError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            SubmitError::NetworkError(_) | SubmitError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let envelope = match self {
            SubmitError::ValidationError(errors) => Envelope::invalid(errors.clone()),
            SubmitError::RejectedError { message, .. } => Envelope::failed(message.as_str()),
            SubmitError::NetworkError(_) => {
                tracing::error!(error.cause_chain = ?self, "Webhook is unreachable");
                Envelope::failed("Network error: Failed to connect to webhook endpoint")
            }
            SubmitError::UnexpectedError(_) => {
                tracing::error!(error.cause_chain = ?self, "Error submitting form");
                Envelope::failed("Internal server error")
            }
        };
        HttpResponse::build(self.status_code()).json(envelope)
    }
}

/// Revalidates the browser payload and relays it to the webhook once.
#[tracing::instrument(
    name = "Relaying a new submission",
    skip(payload, webhook_client),
    fields(
        subscriber_email = tracing::field::Empty,
        service_name = tracing::field::Empty
    )
)]
pub async fn submit(
    payload: web::Payload,
    webhook_client: web::Data<WebhookClient>,
) -> Result<HttpResponse, SubmitError> {
    let body = read_body(payload).await?;
    let raw: serde_json::Value =
        serde_json::from_slice(&body).context("Failed to parse the request body as JSON")?;
    let request = validate(&raw)?;

    let span = tracing::Span::current();
    span.record("subscriber_email", &tracing::field::display(&request.email));
    span.record(
        "service_name",
        &tracing::field::display(request.service.as_ref()),
    );

    match webhook_client
        .forward(&request)
        .await
        .map_err(SubmitError::NetworkError)?
    {
        WebhookResponse::Accepted(data) => Ok(HttpResponse::Ok().json(Envelope::accepted(data))),
        WebhookResponse::Rejected { status, message } => {
            Err(SubmitError::RejectedError { status, message })
        }
    }
}

/// Collects the request body, failing once it grows past `MAX_BODY_SIZE`.
/// An oversized body is still drained so the client gets to read the envelope.
async fn read_body(mut payload: web::Payload) -> Result<web::BytesMut, SubmitError> {
    let mut body = web::BytesMut::new();
    let mut received = 0usize;
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.context("Failed to read the request body")?;
        received += chunk.len();
        if received <= MAX_BODY_SIZE {
            body.extend_from_slice(&chunk);
        }
    }
    if received > MAX_BODY_SIZE {
        return Err(anyhow::anyhow!(
            "The request body is {} bytes, over the {} byte limit",
            received,
            MAX_BODY_SIZE
        )
        .into());
    }
    Ok(body)
}
