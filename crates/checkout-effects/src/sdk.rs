//! Vendor SDK bindings
//!
//! The SDK installs a global entry point (`Accept` by default). Each link of
//! the capability chain is reached by reflection and checked at call time,
//! so a missing or reshaped SDK fails with `InitError` instead of a panic.

use crate::js::{error_message, method, property, settle};
use async_trait::async_trait;
use checkout_core::{
    InitError, InitStage, PaymentTrigger, SdkEntryEffects, SdkInstance, SdkRejection,
    SessionToken, TargetSurfaces, TransientToken, UnifiedPayments,
};
use serde::Serialize;
use tracing::debug;
use wasm_bindgen::JsValue;

fn call_stage(
    target: &JsValue,
    name: &str,
    stage: InitStage,
    args: &[JsValue],
) -> Result<JsValue, InitError> {
    let function = method(target, name)
        .ok_or_else(|| InitError::rejected(stage, format!("`{name}` is not a function")))?;
    let returned = match args {
        [] => function.call0(target),
        [first] => function.call1(target, first),
        [first, second, ..] => function.call2(target, first, second),
    };
    returned.map_err(|e| InitError::rejected(stage, error_message(&e)))
}

async fn await_stage(value: JsValue, stage: InitStage) -> Result<JsValue, InitError> {
    settle(value)
        .await
        .map_err(|e| InitError::rejected(stage, error_message(&e)))
}

/// The vendor's global entry point
pub struct JsSdkEntryPoint {
    global: String,
}

impl JsSdkEntryPoint {
    /// Bind to the global named `global`
    pub fn new(global: impl Into<String>) -> Self {
        Self {
            global: global.into(),
        }
    }
}

#[async_trait(?Send)]
impl SdkEntryEffects for JsSdkEntryPoint {
    async fn initialize(&self, token: &SessionToken) -> Result<Box<dyn SdkInstance>, InitError> {
        let scope: JsValue = js_sys::global().into();
        if method(&scope, &self.global).is_none() {
            return Err(InitError::EntryPointMissing {
                name: self.global.clone(),
            });
        }
        let returned = call_stage(
            &scope,
            &self.global,
            InitStage::Initialize,
            &[JsValue::from_str(token.as_str())],
        )?;
        let inner = await_stage(returned, InitStage::Initialize).await?;
        debug!(entry_point = %self.global, "SDK instance initialized");
        Ok(Box::new(JsSdkInstance { inner }))
    }
}

/// An initialized SDK instance
pub struct JsSdkInstance {
    inner: JsValue,
}

#[async_trait(?Send)]
impl SdkInstance for JsSdkInstance {
    async fn unified_payments(
        &self,
        embedded: bool,
    ) -> Result<Box<dyn UnifiedPayments>, InitError> {
        let returned = call_stage(
            &self.inner,
            "unifiedPayments",
            InitStage::UnifiedPayments,
            &[JsValue::from_bool(embedded)],
        )?;
        let inner = await_stage(returned, InitStage::UnifiedPayments).await?;
        Ok(Box::new(JsUnifiedPayments { inner }))
    }

    fn supports_dispose(&self) -> bool {
        method(&self.inner, "dispose").is_some()
    }

    fn dispose(&self) -> Result<(), InitError> {
        call_stage(&self.inner, "dispose", InitStage::Dispose, &[]).map(|_| ())
    }
}

#[derive(Serialize)]
struct TriggerOptions<'a> {
    containers: &'a TargetSurfaces,
}

/// The SDK's unified payments object
pub struct JsUnifiedPayments {
    inner: JsValue,
}

#[async_trait(?Send)]
impl UnifiedPayments for JsUnifiedPayments {
    async fn create_trigger(
        &self,
        entry_method: &str,
        targets: &TargetSurfaces,
    ) -> Result<Box<dyn PaymentTrigger>, InitError> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let options = TriggerOptions {
            containers: targets,
        }
        .serialize(&serializer)
        .map_err(|e| InitError::rejected(InitStage::CreateTrigger, e.to_string()))?;

        let returned = call_stage(
            &self.inner,
            "createTrigger",
            InitStage::CreateTrigger,
            &[JsValue::from_str(entry_method), options],
        )?;
        let inner = await_stage(returned, InitStage::CreateTrigger).await?;
        Ok(Box::new(JsPaymentTrigger { inner }))
    }
}

/// A trigger bound to an entry method
pub struct JsPaymentTrigger {
    inner: JsValue,
}

#[async_trait(?Send)]
impl PaymentTrigger for JsPaymentTrigger {
    async fn show(&self) -> Result<TransientToken, SdkRejection> {
        let Some(show) = method(&self.inner, "show") else {
            return Err(SdkRejection::message("trigger has no `show` function"));
        };
        let returned = show.call0(&self.inner).map_err(|e| rejection(&e))?;
        let value = settle(returned).await.map_err(|e| rejection(&e))?;
        match value.as_string() {
            Some(token) => Ok(TransientToken::new(token)),
            None => js_sys::JSON::stringify(&value)
                .ok()
                .and_then(|json| json.as_string())
                .map(TransientToken::new)
                .ok_or_else(|| SdkRejection::message("completion value is not a token")),
        }
    }
}

/// Convert a rejected completion value, keeping its reason code
fn rejection(value: &JsValue) -> SdkRejection {
    let reason = property(value, "reason").and_then(|r| r.as_string());
    SdkRejection {
        reason,
        message: error_message(value),
    }
}
