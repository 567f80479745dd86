use crate::{
    types::{BlockUsage, FeeHistory},
    EstimatorError, Result,
};
use async_trait::async_trait;
use auto_impl::auto_impl;
use ethers_core::{
    types::{BlockNumber, U256},
    utils,
};
use ethers_providers::{JsonRpcClient, Provider};
use std::fmt::Debug;

/// The read-only slice of the node RPC surface an estimation consumes.
///
/// The estimator takes this as an injected capability, so it can run against
/// a real [`Provider`] in production and a stub node in tests. The connection
/// is stateless and shared freely between concurrent estimations.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait NodeClient: Debug + Send + Sync {
    /// Fetches the gas accounting fields of the block for `tag`.
    async fn block_usage(&self, tag: BlockNumber) -> Result<BlockUsage>;

    /// Fetches base fees and reward percentiles for the `block_count` blocks
    /// up to and including `newest_block`.
    async fn fee_history(
        &self,
        block_count: u64,
        newest_block: BlockNumber,
        reward_percentiles: &[f64],
    ) -> Result<FeeHistory>;

    /// Fetches the node's legacy gas price suggestion.
    async fn gas_price(&self) -> Result<U256>;
}

fn provider_err<E>(err: E) -> EstimatorError
where
    E: std::error::Error + Send + Sync + 'static,
{
    EstimatorError::ProviderError(Box::new(err))
}

/// Raw-request implementation over an ethers [`Provider`].
///
/// Issues `eth_feeHistory` directly rather than going through
/// [`ethers_providers::Middleware::fee_history`] so that a response without a
/// `reward` field stays observable as `None` instead of being defaulted to an
/// empty list.
#[async_trait]
impl<C: JsonRpcClient + 'static> NodeClient for Provider<C> {
    async fn block_usage(&self, tag: BlockNumber) -> Result<BlockUsage> {
        let block_tag = utils::serialize(&tag);
        let hydrate_txs = utils::serialize(&false);
        let block: Option<BlockUsage> = self
            .request("eth_getBlockByNumber", [block_tag, hydrate_txs])
            .await
            .map_err(provider_err)?;
        block.ok_or(EstimatorError::BlockNotFound(tag))
    }

    async fn fee_history(
        &self,
        block_count: u64,
        newest_block: BlockNumber,
        reward_percentiles: &[f64],
    ) -> Result<FeeHistory> {
        let newest_block = utils::serialize(&newest_block);
        let reward_percentiles = utils::serialize(&reward_percentiles);

        // The blockCount param is expected to be an unsigned integer up to
        // geth v1.10.6. Geth v1.10.7 onwards, this has been updated to a hex
        // encoded form. Failure to decode the param from client side falls
        // back to the old API spec.
        match self
            .request::<_, FeeHistory>(
                "eth_feeHistory",
                [
                    utils::serialize(&U256::from(block_count)),
                    newest_block.clone(),
                    reward_percentiles.clone(),
                ],
            )
            .await
        {
            Ok(history) => Ok(history),
            Err(err) => self
                .request::<_, FeeHistory>(
                    "eth_feeHistory",
                    [utils::serialize(&block_count), newest_block, reward_percentiles],
                )
                .await
                .map_err(|_| provider_err(err)),
        }
    }

    async fn gas_price(&self) -> Result<U256> {
        self.request("eth_gasPrice", ()).await.map_err(provider_err)
    }
}
