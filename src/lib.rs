#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # Three-tier gas fee estimation for EVM nodes
//!
//! This crate turns a node's recent fee history into three ranked fee
//! recommendations (`fast`, `standard`, `slow`), each carrying a
//! `maxFeePerGas`, a `maxPriorityFeePerGas` and a legacy `gasPrice`, suitable
//! for EIP-2930 (type 1) and EIP-1559 (type 2) transactions.
//!
//! An estimation combines three signals:
//! - the pending block's base fee,
//! - a projection of the next block's base fee from the latest block's
//!   utilization,
//! - a rank-percentile breakdown of the base fees over the sampled history,
//!
//! together with per-tier averages of the historical reward percentiles.
//!
//! The node is abstracted behind the [`NodeClient`] trait, implemented out of
//! the box for any [`ethers_providers::Provider`].
//!
//! # Examples
//!
//! ```no_run
//! use ethers_providers::{Http, Provider};
//! use gas_fee_estimator::FeeEstimator;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("http://localhost:8545")?;
//! let estimator = FeeEstimator::new(provider);
//!
//! let estimation = estimator.estimate().await?;
//! println!("fast: {:?}", estimation.fast.max_fee_per_gas);
//! # Ok(())
//! # }
//! ```

mod base_fee;
pub use base_fee::next_base_fee;

mod estimator;
pub use estimator::{EstimatorConfig, FeeEstimator};

mod node;
pub use node::NodeClient;

mod rewards;
pub use rewards::{average_rewards, RewardAverages};

mod types;
pub use types::{BlockUsage, FeeHistory, GasEstimation, GasFeeData, Percentiles};

pub use ethers_core::types::{BlockNumber, U256};

use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = EstimatorError> = std::result::Result<T, E>;

/// Error thrown when producing a fee estimation.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// The fee history response is unusable: the reward list is missing or
    /// the base fee sequence is empty.
    #[error("fee history response is missing reward or base fee data")]
    InvalidResponse,

    /// The fetched block carries no `baseFeePerGas` field.
    #[error("block does not include a base fee")]
    MissingBaseFee,

    /// The node answered `null` for the requested block tag.
    #[error("no block found for tag {0}")]
    BlockNotFound(BlockNumber),

    /// A node round trip did not complete within the configured bound.
    #[error("node request timed out after {0:?}")]
    Timeout(Duration),

    /// A transport-level failure from the underlying node client, propagated
    /// unclassified.
    #[error(transparent)]
    ProviderError(Box<dyn std::error::Error + Send + Sync>),
}
