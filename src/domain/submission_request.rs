use crate::domain::{
    PhoneNumber, ServiceDate, ServiceName, ServicePrice, SubscriberEmail, SubscriberName,
};

/// One validated service subscription inquiry.
///
/// Only `domain::validate` builds it, so every instance satisfies the field
/// rules and the date ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub name: SubscriberName,
    pub phone: PhoneNumber,
    pub email: SubscriberEmail,
    pub notes: Option<String>,
    pub price: ServicePrice,
    pub service: ServiceName,
    pub start_date: ServiceDate,
    pub end_date: ServiceDate,
}
