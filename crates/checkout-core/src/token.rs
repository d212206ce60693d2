//! # Session Token Decoding
//!
//! A session token is a dot-delimited `header.payload.signature` structure.
//! Only the payload is read, and the signature is never verified here; the
//! vendor SDK re-validates the whole token when it is initialized with it.

use crate::errors::DecodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON pointer to the SDK resource location inside the token payload
pub const RESOURCE_LOCATION_POINTER: &str = "/ctx/0/data/clientLibrary";

/// JSON pointer to the SDK integrity digest inside the token payload
pub const INTEGRITY_DIGEST_POINTER: &str = "/ctx/0/data/clientLibraryIntegrity";

/// Opaque signed token supplied by the caller
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token text, as passed to the SDK entry point
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} bytes>)", self.0.len())
    }
}

impl From<&str> for SessionToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Location and integrity digest of the vendor SDK
///
/// Invariants:
/// - Both fields are non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSdkMetadata")]
pub struct SdkMetadata {
    resource_location: String,
    integrity_digest: String,
}

/// Unchecked wire form; deserialization goes through `SdkMetadata::new`
#[derive(Deserialize)]
struct RawSdkMetadata {
    resource_location: String,
    integrity_digest: String,
}

impl TryFrom<RawSdkMetadata> for SdkMetadata {
    type Error = DecodeError;

    fn try_from(raw: RawSdkMetadata) -> Result<Self, Self::Error> {
        Self::new(raw.resource_location, raw.integrity_digest)
    }
}

impl SdkMetadata {
    /// Build metadata from its parts, rejecting empty fields
    pub fn new(
        resource_location: impl Into<String>,
        integrity_digest: impl Into<String>,
    ) -> Result<Self, DecodeError> {
        let resource_location = resource_location.into();
        let integrity_digest = integrity_digest.into();
        if resource_location.is_empty() {
            return Err(DecodeError::MissingMetadata {
                field: "clientLibrary".to_string(),
            });
        }
        if integrity_digest.is_empty() {
            return Err(DecodeError::MissingMetadata {
                field: "clientLibraryIntegrity".to_string(),
            });
        }
        Ok(Self {
            resource_location,
            integrity_digest,
        })
    }

    /// URI of the SDK resource
    pub fn resource_location(&self) -> &str {
        &self.resource_location
    }

    /// Subresource integrity digest the resource must match
    pub fn integrity_digest(&self) -> &str {
        &self.integrity_digest
    }
}

/// Decode SDK metadata from a session token
///
/// Pure and idempotent: the same token always produces the same result.
pub fn decode(token: &SessionToken) -> Result<SdkMetadata, DecodeError> {
    let segments: Vec<&str> = token.as_str().split('.').collect();
    if segments.len() < 2 {
        return Err(DecodeError::MalformedToken {
            segments: segments.len(),
        });
    }

    let bytes = STANDARD
        .decode(normalize_alphabet(segments[1]))
        .map_err(|e| DecodeError::MalformedPayload {
            message: format!("invalid base64: {e}"),
        })?;
    let payload: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::MalformedPayload {
            message: format!("invalid JSON: {e}"),
        })?;

    let location = required_str(&payload, RESOURCE_LOCATION_POINTER, "clientLibrary")?;
    let digest = required_str(&payload, INTEGRITY_DIGEST_POINTER, "clientLibraryIntegrity")?;
    SdkMetadata::new(location, digest)
}

/// Map the URL-safe alphabet onto the standard one and restore padding
fn normalize_alphabet(segment: &str) -> String {
    let mut normalized: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }
    normalized
}

fn required_str<'a>(
    payload: &'a serde_json::Value,
    pointer: &str,
    field: &str,
) -> Result<&'a str, DecodeError> {
    payload
        .pointer(pointer)
        .and_then(serde_json::Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DecodeError::MissingMetadata {
            field: field.to_string(),
        })
}
