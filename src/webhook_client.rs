use crate::domain::SubmissionRequest;
use crate::utils::{is_truthy, json_text};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{json, Value};

/// Forwards validated submissions to the external webhook.
///
/// Every call is attempted exactly once; there is no retry on any outcome.
#[derive(Clone)]
pub struct WebhookClient {
    http_client: Client,
    url: String,
}

/// What the webhook made of a forwarded submission.
#[derive(Debug, PartialEq)]
pub enum WebhookResponse {
    /// 2xx, with the normalized response body.
    Accepted(Value),
    /// Any other status, with the best error text found in the body.
    Rejected { status: u16, message: String },
}

impl WebhookClient {
    /// Without a `timeout` the client never gives up on a slow webhook.
    pub fn new(url: String, timeout: Option<std::time::Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
            url,
        })
    }

    /// Errors only on transport failures (connection, DNS, timeout); every
    /// HTTP response, whatever its status, is a `WebhookResponse`.
    #[tracing::instrument(name = "Forwarding submission to webhook", skip(self, request))]
    pub async fn forward(
        &self,
        request: &SubmissionRequest,
    ) -> Result<WebhookResponse, reqwest::Error> {
        let payload = WebhookPayload::from(request);
        tracing::info!(webhook_url = %self.url, "Submitting to webhook");
        tracing::debug!(payload = ?payload, "Webhook payload");

        let response = self
            .http_client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        // A body that cannot be read is treated like an empty one.
        let body = response.bytes().await.unwrap_or_default();

        if status.is_success() {
            Ok(WebhookResponse::Accepted(accepted_payload(
                content_type.as_deref(),
                &body,
            )))
        } else {
            let message = rejection_message(status.as_u16(), &body);
            tracing::error!(
                status = status.as_u16(),
                error_message = %message,
                "Webhook rejected the submission"
            );
            Ok(WebhookResponse::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct WebhookPayload<'a> {
    name: &'a str,
    phone_number: &'a str,
    email: &'a str,
    notes: Option<&'a str>,
    service_price: f64,
    service_name: &'a str,
    start_date: &'a str,
    end_date: &'a str,
}

impl<'a> From<&'a SubmissionRequest> for WebhookPayload<'a> {
    fn from(request: &'a SubmissionRequest) -> Self {
        Self {
            name: request.name.as_ref(),
            phone_number: request.phone.as_ref(),
            email: request.email.as_ref(),
            notes: request.notes.as_deref().filter(|notes| !notes.is_empty()),
            service_price: request.price.value(),
            service_name: request.service.as_ref(),
            start_date: request.start_date.as_ref(),
            end_date: request.end_date.as_ref(),
        }
    }
}

/// Body of a 2xx response: parsed JSON when declared as such, otherwise the
/// text wrapped as `{"message": ...}`, or `{"success": true}` when empty.
fn accepted_payload(content_type: Option<&str>, body: &[u8]) -> Value {
    let placeholder = json!({ "success": true });
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    if is_json {
        return serde_json::from_slice(body).unwrap_or(placeholder);
    }
    let text = String::from_utf8_lossy(body);
    if text.is_empty() {
        placeholder
    } else {
        json!({ "message": text })
    }
}

/// Error text of a non-2xx response. A JSON body contributes its `message` or
/// `error`; a non-JSON body contributes its raw text.
fn rejection_message(status: u16, body: &[u8]) -> String {
    let fallback = format!(
        "Failed to submit form to external endpoint (Status: {})",
        status
    );
    match serde_json::from_slice::<Value>(body) {
        Ok(parsed) => ["message", "error"]
            .iter()
            .filter_map(|key| parsed.get(*key))
            .find(|value| is_truthy(value))
            .map(json_text)
            .unwrap_or(fallback),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            if text.is_empty() {
                fallback
            } else {
                text.into_owned()
            }
        }
    }
}
