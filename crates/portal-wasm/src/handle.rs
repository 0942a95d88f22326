//! JS-facing application handle

use crate::error::{WasmError, WasmResult};
use crate::program::JsRegistryProgram;
use crate::wallet::PhantomWallet;
use crate::{console_log, console_warn};
use js_sys::Promise;
use portal_app::PortalApp;
use portal_core::{ProgramId, RegistryKeypair, RegistrySessionConfig};
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Portal application exported to JavaScript.
///
/// Every async method returns a `Promise`; failures reject with an `Error`
/// carrying `kind` and `hint` properties.
#[wasm_bindgen]
pub struct PortalHandle {
    app: Rc<PortalApp>,
}

#[wasm_bindgen]
impl PortalHandle {
    /// Create a handle.
    ///
    /// `registry_program` is the page's registry object. `keypair` is the
    /// persisted registry keypair (32 or 64 bytes); without it a registry
    /// is generated for this page session only.
    #[wasm_bindgen(constructor)]
    pub fn new(
        registry_program: JsValue,
        program_id: &str,
        keypair: Option<Vec<u8>>,
    ) -> Result<PortalHandle, JsValue> {
        let program_id: ProgramId = program_id.parse().map_err(|e| {
            WasmError::from(portal_core::PortalError::config(format!("program id: {e}")))
        })?;

        let config = match keypair {
            Some(bytes) => {
                let keypair = RegistryKeypair::from_key_material(&bytes).map_err(|e| {
                    WasmError::from(portal_core::PortalError::keystore(e.to_string()))
                })?;
                RegistrySessionConfig::persisted(keypair, program_id)
            }
            None => {
                console_warn!("No registry keypair supplied, using a per-session registry");
                RegistrySessionConfig::ephemeral(program_id)
            }
        };
        console_log!("Registry address: {}", config.registry_address());

        let app = PortalApp::new(
            Arc::new(PhantomWallet::from_window()),
            Arc::new(JsRegistryProgram::new(registry_program)),
            config,
        );
        Ok(PortalHandle { app: Rc::new(app) })
    }

    /// Registry address as hex.
    #[wasm_bindgen(getter, js_name = registryAddress)]
    pub fn registry_address(&self) -> String {
        self.app.client().registry_address().to_string()
    }

    /// Reconnect silently and load the registry. Resolves to the identity
    /// or `null`.
    pub fn start(&self) -> Promise {
        let app = self.app.clone();
        future_to_promise(async move {
            Ok(match app.start().await {
                Some(identity) => JsValue::from_str(&identity.to_string()),
                None => JsValue::NULL,
            })
        })
    }

    /// Interactive connect. Resolves to the identity.
    pub fn connect(&self) -> Promise {
        let app = self.app.clone();
        future_to_promise(async move {
            let identity = app.connect().await.map_err(WasmError::from)?;
            Ok(JsValue::from_str(&identity.to_string()))
        })
    }

    /// Disconnect the wallet.
    pub fn disconnect(&self) -> Promise {
        let app = self.app.clone();
        future_to_promise(async move {
            app.disconnect().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Create the registry. Resolves to the transaction signature.
    pub fn initialize(&self) -> Promise {
        let app = self.app.clone();
        future_to_promise(async move {
            let ack = app.initialize_registry().await.map_err(WasmError::from)?;
            console_log!("Initialized registry: {}", ack.signature);
            Ok(JsValue::from_str(&ack.signature))
        })
    }

    /// Submit a link. Resolves to the transaction signature.
    pub fn submit(&self, link: String) -> Promise {
        let app = self.app.clone();
        future_to_promise(async move {
            let ack = app.submit_link(&link).await.map_err(WasmError::from)?;
            Ok(JsValue::from_str(&ack.signature))
        })
    }

    /// Re-fetch the registry. Resolves to the new snapshot.
    pub fn refresh(&self) -> Promise {
        let app = self.app.clone();
        future_to_promise(async move {
            app.refresh().await.map_err(WasmError::from)?;
            snapshot_value(&app).map_err(JsValue::from)
        })
    }

    /// Current state for rendering.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        snapshot_value(&self.app).map_err(JsValue::from)
    }
}

fn snapshot_value(app: &PortalApp) -> WasmResult<JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(serde::Serialize::serialize(&app.snapshot(), &serializer)?)
}
