use chrono::{Months, NaiveDate};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Phone,
    Email,
    Service,
    Price,
    StartDate,
    EndDate,
    Notes,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Phone,
        Field::Email,
        Field::Service,
        Field::Price,
        Field::StartDate,
        Field::EndDate,
        Field::Notes,
    ];

    /// The key used in the JSON payload and in validation issue paths.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Service => "service",
            Field::Price => "price",
            Field::StartDate => "start_date",
            Field::EndDate => "end_date",
            Field::Notes => "notes",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Field values exactly as typed; an empty string means "not filled in".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub price: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            Field::Service => &self.service,
            Field::Price => &self.price,
            Field::StartDate => &self.start_date,
            Field::EndDate => &self.end_date,
            Field::Notes => &self.notes,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Phone => &mut self.phone,
            Field::Email => &mut self.email,
            Field::Service => &mut self.service,
            Field::Price => &mut self.price,
            Field::StartDate => &mut self.start_date,
            Field::EndDate => &mut self.end_date,
            Field::Notes => &mut self.notes,
        };
        *slot = value;
    }

    /// The untyped object handed to the validation schema. Price stays text
    /// and is coerced there.
    pub fn to_raw(&self) -> Value {
        json!({
            "name": self.name,
            "phone": self.phone,
            "email": self.email,
            "service": self.service,
            "price": self.price,
            "start_date": self.start_date,
            "end_date": self.end_date,
            "notes": self.notes,
        })
    }
}

/// `today` and the same day one calendar month later.
///
/// Days past the end of the next month are clamped to its last day, so
/// 2024-01-31 gives 2024-02-29. `None` only at the end of the calendar.
pub fn one_month_range(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    today
        .checked_add_months(Months::new(1))
        .map(|end| (today, end))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
