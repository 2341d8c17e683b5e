#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberName(String);

impl SubscriberName {
    /// Length is counted in UTF-16 code units, the way a browser counts it,
    /// so a single emoji outside the BMP is long enough.
    pub fn parse(s: String) -> Result<SubscriberName, String> {
        if s.encode_utf16().count() < 2 {
            return Err("Name must be at least 2 characters".into());
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
