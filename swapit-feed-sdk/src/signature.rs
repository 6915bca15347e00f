//! HMAC-SHA256 body signing for listing events.
//!
//! The listing service signs every event it pushes to the feed. Header format:
//!
//! ```text
//! SwapIt-Signature: {unix_timestamp}.{base64_signature}
//! ```
//!
//! where the signature is `HMAC-SHA256("{timestamp}.{json_body}", secret)`.

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "SwapIt-Signature";

/// Maximum allowed age of a signature (in seconds).
pub const MAX_SIGNATURE_AGE: i64 = 5 * 60;

/// Marker trait for payloads that travel as signed JSON bodies.
pub trait Signature: for<'de> serde::Deserialize<'de> + serde::Serialize {}

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid header format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature expired")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// A typed payload together with the exact JSON that was signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedObject<T: Signature> {
    pub body: T,
    pub timestamp: i64,
    pub json: String,
    pub signature: Box<[u8]>,
}

impl<T: Signature> SignedObject<T> {
    /// Serialize and sign `body` with the current time.
    pub fn new(body: T, key: &[u8]) -> Result<Self, serde_json::Error> {
        Self::new_at(body, key, time::OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Serialize and sign `body` with an explicit timestamp.
    pub fn new_at(body: T, key: &[u8], timestamp: i64) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(&body)?;
        let signature = sign(timestamp, &json, key);
        Ok(Self {
            body,
            timestamp,
            json,
            signature,
        })
    }

    /// Rebuild a signed object from a `SwapIt-Signature` header and the raw
    /// request body. Does not verify; call [`verify`](Self::verify).
    pub fn from_header_and_body(
        header_value: &str,
        body_json: String,
    ) -> Result<Self, SignatureError> {
        let (timestamp, signature) = parse_signature_header(header_value)?;
        let body: T = serde_json::from_str(&body_json)?;
        Ok(Self {
            body,
            timestamp,
            json: body_json,
            signature,
        })
    }

    /// Check the HMAC and the timestamp age, returning the payload.
    pub fn verify(self, key: &[u8]) -> Result<T, SignatureError> {
        let data = format!("{}.{}", self.timestamp, self.json);
        ring::hmac::verify(
            &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
            data.as_bytes(),
            self.signature.as_ref(),
        )?;
        check_timestamp(self.timestamp)?;
        Ok(self.body)
    }

    /// Full header value, `{timestamp}.{base64}`.
    pub fn to_header(&self) -> String {
        format_signature_header(self.timestamp, &self.signature)
    }
}

fn sign(timestamp: i64, json: &str, key: &[u8]) -> Box<[u8]> {
    let data = format!("{timestamp}.{json}");
    let tag = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        data.as_bytes(),
    );
    tag.as_ref().to_owned().into_boxed_slice()
}

/// Split a `{timestamp}.{base64}` header value.
pub fn parse_signature_header(value: &str) -> Result<(i64, Box<[u8]>), SignatureError> {
    let (timestamp, encoded) = value.split_once('.').ok_or(SignatureError::InvalidFormat)?;
    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidFormat)?;
    let signature = fast32::base64::RFC4648_NOPAD
        .decode_str(encoded)
        .map_err(|_| SignatureError::InvalidBase64)?
        .into_boxed_slice();
    Ok((timestamp, signature))
}

pub fn format_signature_header(timestamp: i64, signature: &[u8]) -> String {
    format!(
        "{}.{}",
        timestamp,
        fast32::base64::RFC4648_NOPAD.encode(signature)
    )
}

/// Reject signatures older than [`MAX_SIGNATURE_AGE`].
pub fn check_timestamp(timestamp: i64) -> Result<(), SignatureError> {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    if now - timestamp > MAX_SIGNATURE_AGE {
        return Err(SignatureError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ListingEventKind, ListingEventPayload};
    use uuid::Uuid;

    const KEY: &[u8] = b"listing-service-secret";

    fn payload() -> ListingEventPayload {
        ListingEventPayload {
            kind: ListingEventKind::Created,
            listing_id: Uuid::nil(),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let signed = SignedObject::new(payload(), KEY).unwrap();
        let header = signed.to_header();
        let parsed =
            SignedObject::<ListingEventPayload>::from_header_and_body(&header, signed.json)
                .unwrap();
        assert_eq!(parsed.verify(KEY).unwrap(), payload());
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let signed = SignedObject::new(payload(), KEY).unwrap();
        assert!(matches!(
            signed.verify(b"other"),
            Err(SignatureError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_expired_signature_is_rejected() {
        let old = time::OffsetDateTime::now_utc().unix_timestamp() - MAX_SIGNATURE_AGE - 10;
        let signed = SignedObject::new_at(payload(), KEY, old).unwrap();
        assert!(matches!(signed.verify(KEY), Err(SignatureError::Expired)));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse_signature_header("no-dot-here"),
            Err(SignatureError::InvalidFormat)
        ));
        assert!(matches!(
            parse_signature_header("123.!!!"),
            Err(SignatureError::InvalidBase64)
        ));
    }
}
