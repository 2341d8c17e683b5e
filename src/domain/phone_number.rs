#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Only the length is checked, in UTF-16 code units; separators and
    /// country prefixes are kept as typed.
    pub fn parse(s: String) -> Result<PhoneNumber, String> {
        if s.encode_utf16().count() < 10 {
            return Err("Phone number must be at least 10 characters".into());
        }
        Ok(Self(s))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
