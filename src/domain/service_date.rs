use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A start or end date as the user entered it.
///
/// The raw text is forwarded untouched; the parsed instant is only used to
/// enforce the ordering between the two dates of a service period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDate {
    raw: String,
    instant: Option<NaiveDateTime>,
}

impl ServiceDate {
    /// `label` names the field in the error message, e.g. "Start date".
    pub fn parse(s: String, label: &str) -> Result<ServiceDate, String> {
        if s.is_empty() {
            return Err(format!("{} is required", label));
        }
        let instant = parse_instant(&s);
        Ok(Self { raw: s, instant })
    }

    /// Midnight UTC for a calendar date, the UTC instant for a timestamp with
    /// an offset, the wall-clock time for one without. `None` when the text is
    /// none of these.
    pub fn instant(&self) -> Option<NaiveDateTime> {
        self.instant
    }
}

impl AsRef<str> for ServiceDate {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
            return Some(timestamp);
        }
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|timestamp| timestamp.naive_utc())
}

/// Succeeds only when both dates parse and `end` is not before `start`.
pub fn check_period(start: &ServiceDate, end: &ServiceDate) -> Result<(), String> {
    match (start.instant(), end.instant()) {
        (Some(start), Some(end)) if end >= start => Ok(()),
        _ => Err("End date must be after or equal to start date".into()),
    }
}
