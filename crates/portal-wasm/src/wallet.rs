//! Injected wallet provider
//!
//! Talks to the provider a wallet extension injects at `window.solana`.
//! Phantom marks itself with `isPhantom`, which is the only provider kind
//! the client reconnects to silently.

use crate::error::js_message;
use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use portal_core::effects::{ConnectOptions, WalletError, WalletProvider};
use portal_core::Identity;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Provider error code for a declined request.
const USER_REJECTED_CODE: f64 = 4001.0;

/// [`WalletProvider`] over `window.solana`.
pub struct PhantomWallet {
    provider: Option<JsValue>,
}

impl PhantomWallet {
    /// Look up the provider on the current window.
    pub fn from_window() -> Self {
        let provider = web_sys::window()
            .and_then(|window| Reflect::get(&window, &"solana".into()).ok())
            .filter(|value| !value.is_undefined() && !value.is_null());
        Self { provider }
    }

    /// Wrap an explicit provider object.
    pub fn from_provider(provider: JsValue) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    fn provider(&self) -> Result<&JsValue, WalletError> {
        self.provider.as_ref().ok_or(WalletError::Unavailable)
    }

    async fn call(&self, method: &str, args: &Array) -> Result<JsValue, JsValue> {
        let provider = self.provider.as_ref().ok_or(JsValue::UNDEFINED)?;
        let function: Function = Reflect::get(provider, &method.into())?.dyn_into()?;
        let returned = function.apply(provider, args)?;
        match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await,
            Err(value) => Ok(value),
        }
    }
}

/// Identity from a provider public key object or hex string.
pub fn identity_from_js(value: &JsValue) -> Option<Identity> {
    if let Some(text) = value.as_string() {
        return text.parse().ok();
    }
    let to_bytes: Function = Reflect::get(value, &"toBytes".into())
        .ok()?
        .dyn_into()
        .ok()?;
    let bytes = to_bytes.call0(value).ok()?;
    Identity::try_from_slice(&Uint8Array::new(&bytes).to_vec()).ok()
}

fn classify(err: JsValue, options: ConnectOptions) -> WalletError {
    let code = Reflect::get(&err, &"code".into())
        .ok()
        .and_then(|code| code.as_f64());
    if code == Some(USER_REJECTED_CODE) {
        return if options.only_if_trusted {
            WalletError::NotTrusted
        } else {
            WalletError::UserRejected
        };
    }
    if options.only_if_trusted {
        return WalletError::NotTrusted;
    }
    WalletError::Provider(js_message(&err))
}

#[async_trait(?Send)]
impl WalletProvider for PhantomWallet {
    fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    fn is_trusted_provider_kind(&self) -> bool {
        self.provider
            .as_ref()
            .and_then(|provider| Reflect::get(provider, &"isPhantom".into()).ok())
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false)
    }

    async fn connect(&self, options: ConnectOptions) -> Result<Identity, WalletError> {
        self.provider()?;
        let request = Object::new();
        if options.only_if_trusted {
            Reflect::set(&request, &"onlyIfTrusted".into(), &JsValue::TRUE)
                .map_err(|err| WalletError::Provider(js_message(&err)))?;
        }

        let response = self
            .call("connect", &Array::of1(&request))
            .await
            .map_err(|err| classify(err, options))?;
        let public_key = Reflect::get(&response, &"publicKey".into())
            .map_err(|err| WalletError::Provider(js_message(&err)))?;
        identity_from_js(&public_key)
            .ok_or_else(|| WalletError::Provider("wallet returned no public key".to_string()))
    }

    fn public_key(&self) -> Option<Identity> {
        let provider = self.provider.as_ref()?;
        let public_key = Reflect::get(provider, &"publicKey".into()).ok()?;
        if public_key.is_null() || public_key.is_undefined() {
            return None;
        }
        identity_from_js(&public_key)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.provider()?;
        self.call("disconnect", &Array::new())
            .await
            .map(|_| ())
            .map_err(|err| WalletError::Provider(js_message(&err)))
    }
}
