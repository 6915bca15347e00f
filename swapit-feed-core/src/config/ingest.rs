//! Event ingress configuration.

/// HMAC secret shared with the listing service.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    secret: Box<[u8]>,
}

impl IngestConfig {
    pub fn new(secret: impl Into<Box<[u8]>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}
