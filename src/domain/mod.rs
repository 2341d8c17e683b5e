mod phone_number;
mod schema;
mod service;
mod service_date;
mod submission_request;
mod subscriber_email;
mod subscriber_name;

pub use phone_number::PhoneNumber;
pub use schema::{validate, FieldIssue, IssueCode, ValidationErrors};
pub use service::{ServiceName, ServicePrice};
pub use service_date::{check_period, ServiceDate};
pub use submission_request::SubmissionRequest;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_name::SubscriberName;
