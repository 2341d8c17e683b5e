//! The rule set shared by the submission form and the `/api/submit` handler.
//!
//! Both sides call [`validate`] on the same untyped JSON object, so a payload
//! the form accepts is never rejected by the proxy for a different reason.

use crate::domain::{
    check_period, PhoneNumber, ServiceDate, ServiceName, ServicePrice, SubmissionRequest,
    SubscriberEmail, SubscriberName,
};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    TooSmall,
    InvalidString,
    Custom,
}

/// A single violated rule, attributed to the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldIssue {
    pub code: IssueCode,
    pub path: Vec<String>,
    pub message: String,
}

impl FieldIssue {
    fn new(code: IssueCode, field: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            path: vec![field.to_string()],
            message: message.into(),
        }
    }

    /// The top-level field this issue is attached to, if any.
    pub fn field(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{} field(s) failed validation", .0.len())]
pub struct ValidationErrors(Vec<FieldIssue>);

impl ValidationErrors {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldIssue> + 'a {
        self.0.iter().filter(move |issue| issue.field() == Some(field))
    }
}

/// Checks `raw` against the submission rules.
///
/// Field rules run in declaration order, one issue per failing field. The
/// date-order rule only runs once both dates passed their own rules, so a bad
/// start date never produces a second, derived issue on `end_date`.
pub fn validate(raw: &Value) -> Result<SubmissionRequest, ValidationErrors> {
    let fields = match raw.as_object() {
        Some(fields) => fields,
        None => {
            return Err(ValidationErrors(vec![FieldIssue {
                code: IssueCode::InvalidType,
                path: vec![],
                message: format!("Expected object, received {}", type_name(raw)),
            }]))
        }
    };

    let mut checker = Checker {
        fields,
        issues: vec![],
    };
    let name = checker.string("name", IssueCode::TooSmall, SubscriberName::parse);
    let phone = checker.string("phone", IssueCode::TooSmall, PhoneNumber::parse);
    let email = checker.string("email", IssueCode::InvalidString, SubscriberEmail::parse);
    let notes = checker.optional_string("notes");
    let price = checker.number("price", IssueCode::TooSmall, ServicePrice::parse);
    let service = checker.string("service", IssueCode::TooSmall, ServiceName::parse);
    let start_date = checker.string("start_date", IssueCode::TooSmall, |s| {
        ServiceDate::parse(s, "Start date")
    });
    let end_date = checker.string("end_date", IssueCode::TooSmall, |s| {
        ServiceDate::parse(s, "End date")
    });

    if let (Some(start), Some(end)) = (&start_date, &end_date) {
        if let Err(message) = check_period(start, end) {
            checker.push(FieldIssue::new(IssueCode::Custom, "end_date", message));
        }
    }

    match (
        name, phone, email, notes, price, service, start_date, end_date,
    ) {
        (
            Some(name),
            Some(phone),
            Some(email),
            Some(notes),
            Some(price),
            Some(service),
            Some(start_date),
            Some(end_date),
        ) if checker.issues.is_empty() => Ok(SubmissionRequest {
            name,
            phone,
            email,
            notes,
            price,
            service,
            start_date,
            end_date,
        }),
        _ => Err(ValidationErrors(checker.issues)),
    }
}

struct Checker<'a> {
    fields: &'a Map<String, Value>,
    issues: Vec<FieldIssue>,
}

impl Checker<'_> {
    fn push(&mut self, issue: FieldIssue) {
        self.issues.push(issue);
    }

    fn record<T>(&mut self, field: &str, code: IssueCode, outcome: Result<T, String>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(FieldIssue::new(code, field, message));
                None
            }
        }
    }

    fn string<T>(
        &mut self,
        field: &str,
        code: IssueCode,
        parse: impl FnOnce(String) -> Result<T, String>,
    ) -> Option<T> {
        match self.fields.get(field) {
            None | Some(Value::Null) => {
                self.push(FieldIssue::new(IssueCode::InvalidType, field, "Required"));
                None
            }
            Some(Value::String(s)) => self.record(field, code, parse(s.clone())),
            Some(other) => {
                let message = format!("Expected string, received {}", type_name(other));
                self.push(FieldIssue::new(IssueCode::InvalidType, field, message));
                None
            }
        }
    }

    /// `Some(None)` when the field is absent, `None` when it is present with the wrong type.
    fn optional_string(&mut self, field: &str) -> Option<Option<String>> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s.clone())),
            Some(other) => {
                let message = format!("Expected string, received {}", type_name(other));
                self.push(FieldIssue::new(IssueCode::InvalidType, field, message));
                None
            }
        }
    }

    /// Numeric strings are coerced, as a number input would hand them over.
    fn number<T>(
        &mut self,
        field: &str,
        code: IssueCode,
        parse: impl FnOnce(f64) -> Result<T, String>,
    ) -> Option<T> {
        let number = match self.fields.get(field) {
            None | Some(Value::Null) => {
                self.push(FieldIssue::new(IssueCode::InvalidType, field, "Required"));
                return None;
            }
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Some(other) => {
                let message = format!("Expected number, received {}", type_name(other));
                self.push(FieldIssue::new(IssueCode::InvalidType, field, message));
                return None;
            }
        };
        match number {
            Some(n) => self.record(field, code, parse(n)),
            None => {
                let message = "Expected number, received nan";
                self.push(FieldIssue::new(IssueCode::InvalidType, field, message));
                None
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
