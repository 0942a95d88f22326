//! Registry program bridge
//!
//! Forwards registry calls to a JS object supplied by the page:
//!
//! ```js
//! {
//!   initialize(request)  -> Promise<string>          // transaction signature
//!   appendEntry(request) -> Promise<string>
//!   fetch(addressHex)    -> Promise<Account | null>
//! }
//! ```
//!
//! The object owns the connection, the wallet signature and the
//! confirmation policy; this side only shapes requests and maps results.

use crate::error::js_message;
use crate::wire::{classify_rejection, WireAccount, WireRequest};
use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use portal_core::effects::{RegistryRpc, RpcError};
use portal_core::{
    AccountsMap, Ack, Cosignature, RegistryAccount, RegistryAddress, RegistryOperation,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// [`RegistryRpc`] over a page-supplied JS object.
pub struct JsRegistryProgram {
    target: JsValue,
}

impl JsRegistryProgram {
    /// Wrap `target`.
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    async fn invoke(
        &self,
        operation: RegistryOperation,
        arg: JsValue,
    ) -> Result<JsValue, RpcError> {
        let method = operation.method_name();
        let function: Function = Reflect::get(&self.target, &method.into())
            .map_err(|err| RpcError::Transport(js_message(&err)))?
            .dyn_into()
            .map_err(|_| RpcError::Transport(format!("registry object has no `{method}`")))?;

        let returned = function
            .apply(&self.target, &Array::of1(&arg))
            .map_err(rejection)?;
        match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map_err(rejection),
            Err(value) => Ok(value),
        }
    }

    async fn mutate(
        &self,
        operation: RegistryOperation,
        request: WireRequest,
    ) -> Result<Ack, RpcError> {
        let arg = serde_wasm_bindgen::to_value(&request)
            .map_err(|err| RpcError::Transport(err.to_string()))?;
        let signature = self.invoke(operation, arg).await?;
        signature
            .as_string()
            .map(Ack::new)
            .ok_or_else(|| RpcError::Rejected(format!("{operation} returned no signature")))
    }
}

fn rejection(err: JsValue) -> RpcError {
    let code = Reflect::get(&err, &"code".into())
        .ok()
        .and_then(|code| code.as_string());
    classify_rejection(code.as_deref(), js_message(&err))
}

#[async_trait(?Send)]
impl RegistryRpc for JsRegistryProgram {
    async fn initialize(
        &self,
        accounts: AccountsMap,
        signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError> {
        let request = WireRequest {
            accounts,
            signers,
            link: None,
        };
        self.mutate(RegistryOperation::Initialize, request).await
    }

    async fn append_entry(
        &self,
        link: String,
        accounts: AccountsMap,
        signers: Vec<Cosignature>,
    ) -> Result<Ack, RpcError> {
        let request = WireRequest {
            accounts,
            signers,
            link: Some(link),
        };
        self.mutate(RegistryOperation::AppendEntry, request).await
    }

    async fn fetch_account(&self, address: RegistryAddress) -> Result<RegistryAccount, RpcError> {
        let value = self
            .invoke(RegistryOperation::Fetch, address.to_string().into())
            .await?;
        if value.is_null() || value.is_undefined() {
            return Err(RpcError::AccountNotFound);
        }
        let wire: WireAccount = serde_wasm_bindgen::from_value(value)
            .map_err(|err| RpcError::Transport(format!("malformed account: {err}")))?;
        RegistryAccount::try_from(wire).map_err(|err| RpcError::Rejected(err.to_string()))
    }
}
