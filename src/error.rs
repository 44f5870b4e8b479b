//! Error types for the flash swap monitor.
//!
//! This module provides a unified error type [`MonitorError`] covering every
//! failure the transaction pipeline can surface to its caller.
//!
//! # Design
//!
//! The error hierarchy is organized by layer:
//! - [`MonitorError::ConfigError`]: Configuration and environment issues
//! - [`MonitorError::RpcError`]: RPC provider and contract call errors
//! - [`MonitorError::DecodingError`]: Log decoding and parsing errors
//! - [`MonitorError::PriceError`]: Price index request or response errors
//! - [`MonitorError::MathError`]: Decimal conversion errors
//! - [`MonitorError::Uninitialized`]: Handler used before its context was set
//!
//! Pool validation failures never show up here: a candidate that cannot be
//! verified is simply dropped by the validator.
//!
//! # Example
//!
//! ```
//! use uniswap_flash_monitor::error::{MonitorError, MonitorResult};
//!
//! fn require_positive(decimals: u8) -> MonitorResult<()> {
//!     if decimals == 0 {
//!         return Err(MonitorError::math("decimals cannot be zero", None));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Result type alias using [`MonitorError`].
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Boxed underlying error carried by most variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for the flash swap monitor.
#[derive(Debug)]
pub enum MonitorError {
    /// Configuration or environment variable errors.
    ///
    /// Variants include:
    /// - Missing or invalid environment variables
    /// - Invalid addresses, URLs or threshold values
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// RPC provider or contract call errors.
    ///
    /// Variants include:
    /// - Failed to connect to provider
    /// - Reverted `eth_call`
    /// - Transaction or receipt not found
    RpcError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Log decoding or parsing errors.
    DecodingError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Price index errors.
    ///
    /// Variants include:
    /// - HTTP request failure or non-success status
    /// - Malformed response body
    /// - A requested token missing from the response
    PriceError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// Arithmetic or number conversion errors.
    MathError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<BoxedSource>,
    },

    /// The handler was invoked before [`crate::handler::FlashSwapHandler::initialize`].
    Uninitialized,
}

impl MonitorError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use uniswap_flash_monitor::error::MonitorError;
    ///
    /// let err = MonitorError::config("RPC_URL not set", None);
    /// assert!(matches!(err, MonitorError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new RPC error.
    ///
    /// # Example
    ///
    /// ```
    /// use uniswap_flash_monitor::error::MonitorError;
    ///
    /// let err = MonitorError::rpc("Failed to connect to provider", None);
    /// assert!(matches!(err, MonitorError::RpcError { .. }));
    /// ```
    #[must_use]
    pub fn rpc(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::RpcError {
            message: message.into(),
            source,
        }
    }

    /// Create a new decoding error.
    #[must_use]
    pub fn decoding(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::DecodingError {
            message: message.into(),
            source,
        }
    }

    /// Create a new price index error.
    ///
    /// # Example
    ///
    /// ```
    /// use uniswap_flash_monitor::error::MonitorError;
    ///
    /// let err = MonitorError::price("token missing from response", None);
    /// assert!(matches!(err, MonitorError::PriceError { .. }));
    /// ```
    #[must_use]
    pub fn price(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::PriceError {
            message: message.into(),
            source,
        }
    }

    /// Create a new math error.
    #[must_use]
    pub fn math(message: impl Into<String>, source: Option<BoxedSource>) -> Self {
        Self::MathError {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::RpcError { message, .. } => write!(f, "RPC error: {message}"),
            Self::DecodingError { message, .. } => write!(f, "Decoding error: {message}"),
            Self::PriceError { message, .. } => write!(f, "Price error: {message}"),
            Self::MathError { message, .. } => write!(f, "Math error: {message}"),
            Self::Uninitialized => {
                write!(f, "Handler used before initialization")
            }
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. }
            | Self::RpcError { source, .. }
            | Self::DecodingError { source, .. }
            | Self::PriceError { source, .. }
            | Self::MathError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            Self::Uninitialized => None,
        }
    }
}

/// Convert from `eyre::Report` to `MonitorError`.
///
/// Reports that don't fit a specific category are treated as RPC errors.
impl From<eyre::Report> for MonitorError {
    fn from(err: eyre::Report) -> Self {
        Self::RpcError {
            message: err.to_string(),
            source: None,
        }
    }
}
