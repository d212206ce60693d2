//! Session token fixtures

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use checkout_core::SessionToken;
use serde_json::{json, Value};

/// SDK location used by default fixtures
pub const DEFAULT_LOCATION: &str = "https://sdk.example.test/uc/v1/checkout.js";

/// Integrity digest used by default fixtures
pub const DEFAULT_DIGEST: &str = "sha256-q1Fm4nVm8b3oXk0Yt5k9zJm2eXl0Z7pQhT3cVn4dWc8=";

const HEADER: &str = "eyJraWQiOiJ0ZXN0IiwiYWxnIjoiUlMyNTYifQ";
const SIGNATURE: &str = "c2lnbmF0dXJlLW5vdC12ZXJpZmllZA";

/// Payload carrying SDK metadata at the expected path
pub fn metadata_payload(location: &str, digest: &str) -> Value {
    json!({
        "ctx": [{
            "type": "mf-2.0.0",
            "data": {
                "clientLibrary": location,
                "clientLibraryIntegrity": digest,
                "targetOrigins": ["https://merchant.example.test"],
            }
        }],
        "iss": "issuer.example.test",
        "exp": 1_900_000_000u64,
    })
}

/// Three-part token around an arbitrary payload
pub fn token_with_payload(payload: &Value) -> SessionToken {
    let encoded = URL_SAFE_NO_PAD.encode(payload.to_string());
    SessionToken::new(format!("{HEADER}.{encoded}.{SIGNATURE}"))
}

/// Three-part token pointing at `location` with `digest`
pub fn session_token(location: &str, digest: &str) -> SessionToken {
    token_with_payload(&metadata_payload(location, digest))
}

/// Token built from the default fixtures
pub fn default_token() -> SessionToken {
    session_token(DEFAULT_LOCATION, DEFAULT_DIGEST)
}
