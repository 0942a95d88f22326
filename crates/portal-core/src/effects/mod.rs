//! External collaborator interfaces
//!
//! The client core reaches the outside world through two traits:
//!
//! - [`WalletProvider`]: the browser wallet extension (or a test double)
//! - [`RegistryRpc`]: the remote registry program's request/response surface
//!
//! Implementations live in `portal-effects` (in-memory program), `portal-wasm`
//! (browser bindings) and `portal-testkit` (mocks).
//!
//! On native targets both traits are `Send + Sync` so handlers can be shared
//! through `Arc`. On `wasm32` they carry no thread bounds because JS handles
//! are confined to the page's event loop.

pub mod registry;
pub mod wallet;

pub use registry::{RegistryRpc, RpcError};
pub use wallet::{ConnectOptions, WalletError, WalletProvider};

/// Thread-safety bound applied to effect traits on native targets only.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

/// Thread-safety bound applied to effect traits on native targets only.
#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}
