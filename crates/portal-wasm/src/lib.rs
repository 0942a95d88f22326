//! Portal WASM - Browser Bindings
//!
//! Exposes [`PortalHandle`] to JavaScript. The handle drives a
//! `portal_app::PortalApp` whose wallet is the injected `window.solana`
//! provider and whose registry calls go through a JS object supplied by the
//! page (typically a thin wrapper over the program client library).
//!
//! ```js
//! import init, { PortalHandle } from "portal_wasm";
//! await init();
//! const portal = new PortalHandle(registryProgram, programIdHex, keypairBytes);
//! await portal.start();
//! render(portal.snapshot());
//! ```

pub mod error;
pub mod logging;
pub mod wire;

#[cfg(target_arch = "wasm32")]
pub mod handle;
#[cfg(target_arch = "wasm32")]
pub mod program;
#[cfg(target_arch = "wasm32")]
pub mod wallet;

pub use error::{WasmError, WasmResult};
#[cfg(target_arch = "wasm32")]
pub use handle::PortalHandle;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Module start hook.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console_log!("portal-wasm initialized");
}
