//! SDK errors
//!
//! Codec failures pass through unchanged. Lookups that miss in the protocol
//! config get their own variants so callers can tell a typo in an asset name
//! from a network failure in a collaborator.

use storm_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Asset {name} not found in asset index")]
    AssetNotFound { name: String },

    #[error("No opened market for {base}:{collateral}")]
    MarketNotFound { base: String, collateral: String },

    #[error("No liquidity source for {asset}")]
    LiquiditySourceNotFound { asset: String },

    /// Token collateral whose config names no token master address
    #[error("Asset {asset} has no token master address")]
    MissingJettonMaster { asset: String },

    #[error("Invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    /// A collaborator (oracle, resolver, state source) failed
    #[error("{operation} failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SdkError {
    pub fn asset_not_found(name: impl Into<String>) -> Self {
        Self::AssetNotFound { name: name.into() }
    }

    pub fn market_not_found(base: impl Into<String>, collateral: impl Into<String>) -> Self {
        Self::MarketNotFound {
            base: base.into(),
            collateral: collateral.into(),
        }
    }

    pub fn liquidity_source_not_found(asset: impl Into<String>) -> Self {
        Self::LiquiditySourceNotFound {
            asset: asset.into(),
        }
    }

    pub fn invalid_parameter(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    pub fn provider(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Provider { operation, source }
    }

    /// Whether the failure came from configuration rather than the network
    /// or the codec
    pub fn is_config_lookup(&self) -> bool {
        matches!(
            self,
            SdkError::AssetNotFound { .. }
                | SdkError::MarketNotFound { .. }
                | SdkError::LiquiditySourceNotFound { .. }
                | SdkError::MissingJettonMaster { .. }
        )
    }
}

pub type SdkResult<T> = std::result::Result<T, SdkError>;
