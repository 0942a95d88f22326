//! Categorized client errors
//!
//! [`PortalError`] is what every client operation returns. [`ErrorKind`] is
//! the copyable tag the state machine records, and [`ErrorCategory`] groups
//! kinds for a renderer choosing how to present a failure.

use crate::effects::registry::RpcError;
use crate::effects::wallet::WalletError;
use crate::registry::RegistryOperation;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by user)
    Input,
    /// Wallet provider missing or connection declined
    Wallet,
    /// Registry account state does not allow the operation
    Registry,
    /// Transport or remote rejection (often transient)
    Network,
    /// Configuration or key material problems
    Config,
}

impl ErrorCategory {
    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input | Self::Wallet | Self::Config)
    }

    /// Check if this error category is likely transient.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Wallet => "Wallet",
            Self::Registry => "Registry",
            Self::Network => "Network",
            Self::Config => "Config",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Check your input and try again",
            Self::Wallet => "Install or unlock a wallet and connect again",
            Self::Registry => "Refresh to load the current registry state",
            Self::Network => "Check your network connection and retry",
            Self::Config => "Review your configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Portal Error
// ============================================================================

/// Errors surfaced by client operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    /// No wallet provider is present
    #[error("No wallet provider found")]
    WalletUnavailable,

    /// The user declined the connection prompt
    #[error("Wallet connection rejected by user")]
    UserRejectedConnection,

    /// The wallet provider failed while connecting
    #[error("Wallet provider error: {reason}")]
    WalletFailed {
        /// Provider-reported failure
        reason: String,
    },

    /// A mutating operation was attempted without a connected wallet
    #[error("Wallet not connected")]
    NotConnected,

    /// The registry account does not exist yet
    #[error("Registry account not initialized")]
    AccountNotInitialized,

    /// The registry address already holds an account
    #[error("Registry account already initialized")]
    AlreadyInitialized,

    /// Signature, network or remote program rejection on a mutating call
    #[error("Transaction failed: {reason}")]
    TransactionFailed {
        /// Underlying failure description
        reason: String,
    },

    /// The registry account was not found
    #[error("Registry account not found")]
    NotFound,

    /// A read of the registry failed
    #[error("Fetch failed: {reason}")]
    FetchFailed {
        /// Underlying failure description
        reason: String,
    },

    /// Submitted link was empty
    #[error("Link must not be empty")]
    EmptyLink,

    /// Another submission is still outstanding
    #[error("A submission is already in flight")]
    SubmissionInFlight,

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Persisted key material could not be loaded or stored
    #[error("Keystore error: {message}")]
    Keystore {
        /// What was wrong
        message: String,
    },
}

impl PortalError {
    /// Create a transaction failure
    pub fn transaction_failed(reason: impl Into<String>) -> Self {
        Self::TransactionFailed {
            reason: reason.into(),
        }
    }

    /// Create a fetch failure
    pub fn fetch_failed(reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            reason: reason.into(),
        }
    }

    /// Create a wallet provider failure
    pub fn wallet_failed(reason: impl Into<String>) -> Self {
        Self::WalletFailed {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a keystore error
    pub fn keystore(message: impl Into<String>) -> Self {
        Self::Keystore {
            message: message.into(),
        }
    }

    /// Map a remote failure of `operation` into the client taxonomy.
    ///
    /// Account-state failures keep their meaning; everything else is a
    /// transaction failure for mutations and a fetch failure for reads.
    pub fn from_rpc(operation: RegistryOperation, err: RpcError) -> Self {
        match err {
            RpcError::AccountNotFound if operation.is_mutation() => Self::AccountNotInitialized,
            RpcError::AccountNotFound => Self::NotFound,
            RpcError::AccountAlreadyInitialized => Self::AlreadyInitialized,
            other if operation.is_mutation() => Self::transaction_failed(other.to_string()),
            other => Self::fetch_failed(other.to_string()),
        }
    }

    /// Copyable tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WalletUnavailable => ErrorKind::WalletUnavailable,
            Self::UserRejectedConnection => ErrorKind::UserRejectedConnection,
            Self::WalletFailed { .. } => ErrorKind::WalletFailed,
            Self::NotConnected => ErrorKind::NotConnected,
            Self::AccountNotInitialized => ErrorKind::AccountNotInitialized,
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::TransactionFailed { .. } => ErrorKind::TransactionFailed,
            Self::NotFound => ErrorKind::NotFound,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::EmptyLink => ErrorKind::EmptyLink,
            Self::SubmissionInFlight => ErrorKind::SubmissionInFlight,
            Self::Config { .. } => ErrorKind::Config,
            Self::Keystore { .. } => ErrorKind::Keystore,
        }
    }

    /// Get the error category for this error.
    pub fn category(&self) -> ErrorCategory {
        self.kind().category()
    }
}

impl From<WalletError> for PortalError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Unavailable | WalletError::NotTrusted => Self::WalletUnavailable,
            WalletError::UserRejected => Self::UserRejectedConnection,
            WalletError::Provider(reason) => Self::wallet_failed(reason),
        }
    }
}

/// Copyable error tag recorded by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`PortalError::WalletUnavailable`]
    WalletUnavailable,
    /// See [`PortalError::UserRejectedConnection`]
    UserRejectedConnection,
    /// See [`PortalError::WalletFailed`]
    WalletFailed,
    /// See [`PortalError::NotConnected`]
    NotConnected,
    /// See [`PortalError::AccountNotInitialized`]
    AccountNotInitialized,
    /// See [`PortalError::AlreadyInitialized`]
    AlreadyInitialized,
    /// See [`PortalError::TransactionFailed`]
    TransactionFailed,
    /// See [`PortalError::NotFound`]
    NotFound,
    /// See [`PortalError::FetchFailed`]
    FetchFailed,
    /// See [`PortalError::EmptyLink`]
    EmptyLink,
    /// See [`PortalError::SubmissionInFlight`]
    SubmissionInFlight,
    /// See [`PortalError::Config`]
    Config,
    /// See [`PortalError::Keystore`]
    Keystore,
}

impl ErrorKind {
    /// Category used for presentation.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::WalletUnavailable
            | Self::UserRejectedConnection
            | Self::WalletFailed
            | Self::NotConnected => ErrorCategory::Wallet,
            Self::AccountNotInitialized | Self::AlreadyInitialized | Self::NotFound => {
                ErrorCategory::Registry
            }
            Self::TransactionFailed | Self::FetchFailed => ErrorCategory::Network,
            Self::EmptyLink | Self::SubmissionInFlight => ErrorCategory::Input,
            Self::Config | Self::Keystore => ErrorCategory::Config,
        }
    }

    /// Whether the failure means the wallet session is gone.
    pub fn is_wallet_level(&self) -> bool {
        self.category() == ErrorCategory::Wallet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_not_found_depends_on_operation() {
        assert_eq!(
            PortalError::from_rpc(RegistryOperation::AppendEntry, RpcError::AccountNotFound),
            PortalError::AccountNotInitialized
        );
        assert_eq!(
            PortalError::from_rpc(RegistryOperation::Fetch, RpcError::AccountNotFound),
            PortalError::NotFound
        );
    }

    #[test]
    fn test_transport_failure_depends_on_operation() {
        let err = PortalError::from_rpc(
            RegistryOperation::Initialize,
            RpcError::Transport("connection reset".into()),
        );
        assert_eq!(err.kind(), ErrorKind::TransactionFailed);

        let err = PortalError::from_rpc(
            RegistryOperation::Fetch,
            RpcError::Transport("connection reset".into()),
        );
        assert_eq!(err.kind(), ErrorKind::FetchFailed);
    }

    #[test]
    fn test_already_initialized_is_preserved() {
        assert_eq!(
            PortalError::from_rpc(
                RegistryOperation::Initialize,
                RpcError::AccountAlreadyInitialized
            ),
            PortalError::AlreadyInitialized
        );
    }

    #[test]
    fn test_wallet_errors_map_to_wallet_category() {
        let unavailable: PortalError = WalletError::Unavailable.into();
        let rejected: PortalError = WalletError::UserRejected.into();
        assert_eq!(unavailable, PortalError::WalletUnavailable);
        assert_eq!(rejected, PortalError::UserRejectedConnection);
        assert!(rejected.kind().is_wallet_level());
    }

    #[test]
    fn test_provider_failure_is_wallet_level() {
        let err: PortalError = WalletError::Provider("extension crashed".into()).into();
        assert_eq!(err, PortalError::wallet_failed("extension crashed"));
        assert_eq!(err.category(), ErrorCategory::Wallet);
        assert!(err.kind().is_wallet_level());
    }

    #[test]
    fn test_categories() {
        assert_eq!(PortalError::EmptyLink.category(), ErrorCategory::Input);
        assert!(ErrorCategory::Input.is_user_correctable());
        assert!(ErrorCategory::Network.is_transient());
        assert!(!ErrorCategory::Registry.is_transient());
        assert_eq!(
            PortalError::fetch_failed("x").category().to_string(),
            "Network"
        );
    }
}
