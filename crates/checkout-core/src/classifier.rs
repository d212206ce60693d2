//! # Vendor Signal Classification
//!
//! Every string the vendor SDK uses to say "the user closed the checkout" is
//! matched here and nowhere else. The vocabulary tracks a versioned external
//! protocol, so it is data (`SignalVocabulary`, loaded from configuration)
//! rather than constants spread across the controller.
//!
//! Recognized close shapes on the side channel:
//! - a text body holding a JSON object whose `event` member is a close event
//! - a structured body whose `source` member is a close source

use crate::outcome::{CancellationSignal, MessagePayload, SdkRejection};
use serde::{Deserialize, Serialize};

/// Reason code the SDK attaches when the user abandons the entry surface
pub const COMPLETE_TRANSACTION_CANCELLED: &str = "COMPLETE_TRANSACTION_CANCELLED";

/// Close event carried by text-framed side-channel messages
pub const CLOSE_APP_EVENT: &str = "closeApp";

/// Close source carried by structured side-channel messages
pub const CLOSE_APP_SOURCE: &str = "mce:App::closeApp";

/// Strings that identify a user-initiated close
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalVocabulary {
    /// Rejection reason codes that mean cancellation
    pub cancellation_reasons: Vec<String>,
    /// `event` tags of text-framed close messages
    pub close_events: Vec<String>,
    /// `source` tags of structured close messages
    pub close_sources: Vec<String>,
}

impl Default for SignalVocabulary {
    fn default() -> Self {
        Self {
            cancellation_reasons: vec![COMPLETE_TRANSACTION_CANCELLED.to_string()],
            close_events: vec![CLOSE_APP_EVENT.to_string()],
            close_sources: vec![CLOSE_APP_SOURCE.to_string()],
        }
    }
}

impl SignalVocabulary {
    fn is_cancellation_reason(&self, reason: &str) -> bool {
        self.cancellation_reasons.iter().any(|r| r == reason)
    }

    fn is_close_event(&self, event: &str) -> bool {
        self.close_events.iter().any(|e| e == event)
    }

    fn is_close_source(&self, source: &str) -> bool {
        self.close_sources.iter().any(|s| s == source)
    }
}

/// How a completion-promise rejection should be treated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionClass {
    /// The user cancelled
    Cancellation(CancellationSignal),
    /// A genuine failure, with the rejection message
    Failure(String),
}

/// Classify a rejection of the SDK's completion promise
pub fn classify_rejection(
    rejection: &SdkRejection,
    vocabulary: &SignalVocabulary,
) -> RejectionClass {
    match rejection.reason.as_deref() {
        Some(reason) if vocabulary.is_cancellation_reason(reason) => {
            RejectionClass::Cancellation(CancellationSignal::ViaRejection {
                reason_code: reason.to_string(),
            })
        }
        _ => RejectionClass::Failure(rejection.message.clone()),
    }
}

/// Classify a side-channel message; `None` for anything that is not a close
///
/// Never fails: bodies that do not parse are simply not close messages.
pub fn classify_message(
    payload: &MessagePayload,
    vocabulary: &SignalVocabulary,
) -> Option<CancellationSignal> {
    let recognized = match payload {
        MessagePayload::Text(text) => serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .as_ref()
            .and_then(|value| value.get("event"))
            .and_then(serde_json::Value::as_str)
            .is_some_and(|event| vocabulary.is_close_event(event)),
        MessagePayload::Structured(value) => value
            .get("source")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|source| vocabulary.is_close_source(source)),
        MessagePayload::Opaque => false,
    };

    recognized.then(|| CancellationSignal::ViaMessage {
        raw: payload.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vocab() -> SignalVocabulary {
        SignalVocabulary::default()
    }

    #[test]
    fn test_recognized_reason_is_cancellation() {
        let rejection = SdkRejection::with_reason(COMPLETE_TRANSACTION_CANCELLED, "closed");
        assert_eq!(
            classify_rejection(&rejection, &vocab()),
            RejectionClass::Cancellation(CancellationSignal::ViaRejection {
                reason_code: COMPLETE_TRANSACTION_CANCELLED.to_string()
            })
        );
    }

    #[test]
    fn test_other_rejections_are_failures() {
        let rejection = SdkRejection::with_reason("CAPTURE_CONTEXT_EXPIRED", "expired");
        assert_eq!(
            classify_rejection(&rejection, &vocab()),
            RejectionClass::Failure("expired".to_string())
        );

        let rejection = SdkRejection::message("network down");
        assert_eq!(
            classify_rejection(&rejection, &vocab()),
            RejectionClass::Failure("network down".to_string())
        );
    }

    #[test]
    fn test_text_framed_close_event() {
        let payload = MessagePayload::Text(json!({ "event": "closeApp" }).to_string());
        assert!(classify_message(&payload, &vocab()).is_some());
    }

    #[test]
    fn test_structured_close_source() {
        let payload = MessagePayload::Structured(json!({ "source": "mce:App::closeApp" }));
        assert_eq!(
            classify_message(&payload, &vocab()),
            Some(CancellationSignal::ViaMessage {
                raw: payload.clone()
            })
        );
    }

    #[test]
    fn test_shapes_do_not_cross() {
        // A source tag only counts on structured bodies, an event tag only on text
        let text = MessagePayload::Text(json!({ "source": "mce:App::closeApp" }).to_string());
        assert_eq!(classify_message(&text, &vocab()), None);

        let structured = MessagePayload::Structured(json!({ "event": "closeApp" }));
        assert_eq!(classify_message(&structured, &vocab()), None);
    }

    #[test]
    fn test_malformed_and_unrelated_messages_are_ignored() {
        let cases = [
            MessagePayload::Text("{not json".to_string()),
            MessagePayload::Text("closeApp".to_string()),
            MessagePayload::Text(json!({ "event": "resize" }).to_string()),
            MessagePayload::Text(json!(["closeApp"]).to_string()),
            MessagePayload::Structured(json!({ "source": 42 })),
            MessagePayload::Structured(json!("mce:App::closeApp")),
            MessagePayload::Opaque,
        ];
        for payload in cases {
            assert_eq!(classify_message(&payload, &vocab()), None, "{payload:?}");
        }
    }

    #[test]
    fn test_vocabulary_is_replaceable() {
        let vocabulary = SignalVocabulary {
            cancellation_reasons: vec!["USER_ABORT".to_string()],
            close_events: vec!["dismiss".to_string()],
            close_sources: vec![],
        };
        let rejection = SdkRejection::with_reason(COMPLETE_TRANSACTION_CANCELLED, "closed");
        assert!(matches!(
            classify_rejection(&rejection, &vocabulary),
            RejectionClass::Failure(_)
        ));
        let payload = MessagePayload::Text(json!({ "event": "dismiss" }).to_string());
        assert!(classify_message(&payload, &vocabulary).is_some());
    }
}
