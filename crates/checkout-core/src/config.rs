//! Checkout configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration. Loading follows the usual layering: defaults, then a file or
//! string, then `CHECKOUT_*` environment overrides, then validation.

use crate::classifier::SignalVocabulary;
use crate::effects::TargetSurfaces;
use crate::errors::{CheckoutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "CHECKOUT_";

/// Full checkout configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Vendor SDK bring-up parameters
    pub sdk: SdkConfig,
    /// Resource attachment parameters
    pub resource: ResourceConfig,
    /// Cancellation vocabulary
    pub signals: SignalVocabulary,
    /// Outbound navigation
    pub navigation: NavigationConfig,
    /// Automatic release of resources on terminal outcomes
    pub cleanup: CleanupPolicy,
    /// Logging
    pub logging: LoggingConfig,
}

/// Vendor SDK bring-up parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Name of the global entry point the SDK resource installs
    pub entry_point: String,
    /// Embedding-mode flag passed when obtaining unified payments
    pub embedded: bool,
    /// Entry method the trigger is bound to
    pub entry_method: String,
    /// Named target surfaces (name to selector)
    pub targets: TargetSurfaces,
}

impl Default for SdkConfig {
    fn default() -> Self {
        let mut targets = TargetSurfaces::new();
        targets.insert(
            "paymentScreen".to_string(),
            "#embeddedPaymentContainer".to_string(),
        );
        Self {
            entry_point: "Accept".to_string(),
            embedded: false,
            entry_method: "PANENTRY".to_string(),
            targets,
        }
    }
}

/// Cross-origin policy applied to the SDK resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossOriginPolicy {
    /// Fetch without credentials
    #[default]
    Anonymous,
    /// Fetch with credentials
    UseCredentials,
}

impl CrossOriginPolicy {
    /// Attribute value understood by the host
    pub fn as_attr(&self) -> &'static str {
        match self {
            CrossOriginPolicy::Anonymous => "anonymous",
            CrossOriginPolicy::UseCredentials => "use-credentials",
        }
    }
}

/// Resource attachment parameters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Cross-origin policy
    pub cross_origin: CrossOriginPolicy,
}

/// Outbound navigation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Destination requested once a cancellation is confirmed
    pub cancel_destination: Option<String>,
}

/// Which terminal outcomes release resources without waiting for `reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupPolicy {
    /// Release on cancellation
    pub on_cancel: bool,
    /// Release on failure
    pub on_failure: bool,
    /// Release on success
    pub on_success: bool,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            on_cancel: true,
            on_failure: true,
            on_success: false,
        }
    }
}

/// Logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl CheckoutConfig {
    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CheckoutError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `CHECKOUT_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `CHECKOUT_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.into();
            match name {
                "ENTRY_POINT" => self.sdk.entry_point = value,
                "ENTRY_METHOD" => self.sdk.entry_method = value,
                "EMBEDDED" => {
                    self.sdk.embedded = value.parse().map_err(|_| {
                        CheckoutError::config(format!(
                            "{ENV_PREFIX}EMBEDDED must be a bool, got {value}"
                        ))
                    })?;
                }
                "CANCEL_DESTINATION" => {
                    self.navigation.cancel_destination = (!value.is_empty()).then_some(value);
                }
                "LOG_FILTER" => self.logging.filter = value,
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sdk.entry_point.trim().is_empty() {
            return Err(CheckoutError::config("sdk.entry_point cannot be empty"));
        }
        if self.sdk.entry_method.trim().is_empty() {
            return Err(CheckoutError::config("sdk.entry_method cannot be empty"));
        }
        if self.sdk.targets.is_empty() {
            return Err(CheckoutError::config(
                "sdk.targets must name at least one surface",
            ));
        }
        if let Some((name, _)) = self
            .sdk
            .targets
            .iter()
            .find(|(name, selector)| name.is_empty() || selector.trim().is_empty())
        {
            return Err(CheckoutError::config(format!(
                "sdk.targets entry `{name}` needs a name and a selector"
            )));
        }
        if self.signals.cancellation_reasons.is_empty() {
            return Err(CheckoutError::config(
                "signals.cancellation_reasons cannot be empty",
            ));
        }
        if self.signals.close_events.is_empty() && self.signals.close_sources.is_empty() {
            return Err(CheckoutError::config(
                "signals needs at least one close event or close source",
            ));
        }
        if let Some(destination) = &self.navigation.cancel_destination {
            if destination.trim().is_empty() {
                return Err(CheckoutError::config(
                    "navigation.cancel_destination cannot be blank",
                ));
            }
        }
        if self.logging.filter.trim().is_empty() {
            return Err(CheckoutError::config("logging.filter cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = CheckoutConfig::from_toml_str("").unwrap();
        assert_eq!(config, CheckoutConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.sdk.entry_method, "PANENTRY");
        assert!(config.cleanup.on_cancel);
        assert!(!config.cleanup.on_success);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = CheckoutConfig::from_toml_str(
            r##"
            [sdk]
            embedded = true

            [sdk.targets]
            paymentSelection = "#buttonPaymentListContainer"
            paymentScreen = "#embeddedPaymentContainer"

            [resource]
            cross_origin = "use-credentials"

            [navigation]
            cancel_destination = "/checkout/cancelled"
            "##,
        )
        .unwrap();
        assert!(config.sdk.embedded);
        assert_eq!(config.sdk.entry_point, "Accept");
        assert_eq!(config.sdk.targets.len(), 2);
        assert_eq!(config.resource.cross_origin.as_attr(), "use-credentials");
        assert_eq!(
            config.navigation.cancel_destination.as_deref(),
            Some("/checkout/cancelled")
        );
        assert_eq!(config.signals, SignalVocabulary::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = CheckoutConfig::from_toml_str("[sdk\nembedded = ").unwrap_err();
        assert!(matches!(err, CheckoutError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CheckoutConfig::default();
        config
            .merge_with_vars([
                ("CHECKOUT_EMBEDDED", "true"),
                ("CHECKOUT_CANCEL_DESTINATION", "/cart"),
                ("CHECKOUT_LOG_FILTER", "checkout_session=debug"),
                ("UNRELATED", "ignored"),
            ])
            .unwrap();
        assert!(config.sdk.embedded);
        assert_eq!(config.navigation.cancel_destination.as_deref(), Some("/cart"));
        assert_eq!(config.logging.filter, "checkout_session=debug");

        let err = config
            .merge_with_vars([("CHECKOUT_EMBEDDED", "sometimes")])
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir()
            .join(format!("checkout-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[sdk]\nentry_method = \"CLICKTOPAY\"\n").unwrap();
        let config = CheckoutConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.unwrap().sdk.entry_method, "CLICKTOPAY");

        let err = CheckoutConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_process_env_overrides() {
        std::env::set_var("CHECKOUT_ENTRY_POINT", "Vendor");
        let mut config = CheckoutConfig::default();
        let merged = config.merge_with_env();
        std::env::remove_var("CHECKOUT_ENTRY_POINT");
        merged.unwrap();
        assert_eq!(config.sdk.entry_point, "Vendor");
    }

    #[test]
    fn test_validation_rejects_unusable_configs() {
        let mut config = CheckoutConfig::default();
        config.sdk.targets.clear();
        assert!(config.validate().is_err());

        let mut config = CheckoutConfig::default();
        config.signals.cancellation_reasons.clear();
        assert!(config.validate().is_err());

        let mut config = CheckoutConfig::default();
        config.signals.close_events.clear();
        config.signals.close_sources.clear();
        assert!(config.validate().is_err());

        let mut config = CheckoutConfig::default();
        config
            .sdk
            .targets
            .insert("paymentSelection".to_string(), " ".to_string());
        assert!(config.validate().is_err());
    }
}
