#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn parse(s: String) -> Result<ServiceName, String> {
        if s.is_empty() {
            return Err("Service is required".into());
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServicePrice(f64);

impl ServicePrice {
    pub fn parse(value: f64) -> Result<ServicePrice, String> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err("Price must be a positive number".into())
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
