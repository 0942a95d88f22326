//! Error handling for the browser bindings

use portal_core::PortalError;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Error type for all binding operations.
#[derive(Error, Debug)]
pub enum WasmError {
    /// A client operation failed.
    #[error(transparent)]
    Portal(#[from] PortalError),

    /// A value could not cross the JS boundary.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JavaScript interop error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),
}

impl WasmError {
    /// Stable kind string surfaced to JS as `error.kind`.
    pub fn kind(&self) -> String {
        match self {
            Self::Portal(err) => format!("{:?}", err.kind()),
            Self::Serialization(_) => "Serialization".to_string(),
            Self::JavaScript(_) => "JavaScript".to_string(),
        }
    }

    /// Resolution hint surfaced to JS as `error.hint`.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Portal(err) => err.category().resolution_hint(),
            Self::Serialization(_) | Self::JavaScript(_) => "Reload the page and try again",
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_val: JsValue) -> Self {
        WasmError::JavaScript(js_message(&js_val))
    }
}

impl From<serde_wasm_bindgen::Error> for WasmError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WasmError::Serialization(err.to_string())
    }
}

impl From<WasmError> for JsValue {
    fn from(err: WasmError) -> Self {
        let js_err = js_sys::Error::new(&err.to_string());
        let _ = js_sys::Reflect::set(&js_err, &"kind".into(), &err.kind().into());
        let _ = js_sys::Reflect::set(&js_err, &"hint".into(), &err.hint().into());
        js_err.into()
    }
}

/// Best-effort message from a thrown JS value.
pub fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| "Unknown JavaScript error".to_string())
}

/// Result type for binding operations
pub type WasmResult<T> = Result<T, WasmError>;
