use subtle::ConstantTimeEq;

/// API key protecting the settings endpoints. No key means no protection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    api_key: Option<String>,
}

impl AuthConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Compares `provided` to the configured key in constant time.
    pub fn authenticate(&self, provided: Option<&str>) -> bool {
        match (&self.api_key, provided) {
            (None, _) => true,
            (Some(expected), Some(provided)) => expected.as_bytes().ct_eq(provided.as_bytes()).into(),
            (Some(_), None) => false,
        }
    }
}
