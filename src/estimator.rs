use crate::{
    base_fee::next_base_fee,
    node::NodeClient,
    rewards::average_rewards,
    types::{GasEstimation, GasFeeData, Percentiles},
    EstimatorError, Result,
};
use ethers_core::types::{BlockNumber, U256};
use futures_timer::Delay;
use futures_util::future::{self, Either};
use std::{future::Future, time::Duration};
use tracing::{debug, warn};

/// Immutable settings for a [`FeeEstimator`], fixed at construction.
#[derive(Clone, Copy, Debug)]
pub struct EstimatorConfig {
    /// Reward percentiles backing the slow/standard/fast tiers.
    pub percentiles: Percentiles,
    /// How many recent blocks the fee history query samples.
    pub block_count: u64,
    /// Upper bound on each node round trip. `None` disables the bound, in
    /// which case a hung node blocks the estimation indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            percentiles: Percentiles::default(),
            block_count: 3,
            request_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Produces three ranked fee recommendations from a node's recent history.
///
/// Stateless per call: every estimation fetches fresh data and nothing is
/// shared between concurrent calls. Failures are not retried — the first
/// failed node round trip aborts the estimation and surfaces to the caller,
/// who owns any retry policy.
#[derive(Clone, Debug)]
#[must_use]
pub struct FeeEstimator<N> {
    node: N,
    config: EstimatorConfig,
}

impl<N: NodeClient> FeeEstimator<N> {
    /// Creates an estimator over `node` with the default configuration
    /// (10/50/90 percentiles over the last 3 blocks, 10 second timeout).
    pub fn new(node: N) -> Self {
        Self { node, config: EstimatorConfig::default() }
    }

    pub fn with_config(node: N, config: EstimatorConfig) -> Self {
        Self { node, config }
    }

    /// Projects the next block's base fee from the latest block's
    /// utilization.
    ///
    /// Fails with [`EstimatorError::MissingBaseFee`] on a pre-London chain.
    pub async fn predict_next_base_fee(&self) -> Result<U256> {
        let block = self.bounded(self.node.block_usage(BlockNumber::Latest)).await?;
        let base_fee = match block.base_fee_per_gas {
            Some(fee) => fee,
            None => {
                warn!(?block, "latest block carries no base fee");
                return Err(EstimatorError::MissingBaseFee);
            }
        };
        Ok(next_base_fee(block.gas_used, block.gas_limit, base_fee))
    }

    /// Produces the three-tier estimation for type 1 (EIP-2930) and type 2
    /// (EIP-1559) transactions, using the configured percentiles.
    pub async fn estimate(&self) -> Result<GasEstimation> {
        self.estimate_with(self.config.percentiles).await
    }

    /// Like [`estimate`](Self::estimate), with an explicit set of reward
    /// percentiles for this call only.
    ///
    /// Each tier's `max_fee_per_gas` is drawn from five candidates — the
    /// pending block's base fee, the projected next base fee, and the three
    /// rank-percentile picks over the sampled base fees — sorted descending,
    /// so `fast >= standard >= slow` always holds. The legacy gas price is
    /// fetched once and attached to every tier.
    pub async fn estimate_with(&self, percentiles: Percentiles) -> Result<GasEstimation> {
        let requested = percentiles.as_array();
        let history = self
            .bounded(self.node.fee_history(
                self.config.block_count,
                BlockNumber::Latest,
                &requested,
            ))
            .await?;
        let rewards = average_rewards(&history)?;

        let pending = self.bounded(self.node.block_usage(BlockNumber::Pending)).await?;
        let pending_base_fee = match pending.base_fee_per_gas {
            Some(fee) => fee,
            None => {
                warn!(?pending, "pending block carries no base fee");
                return Err(EstimatorError::MissingBaseFee);
            }
        };
        let projected_base_fee = self.predict_next_base_fee().await?;

        let mut history_base_fees = history.base_fee_per_gas.clone();
        if history_base_fees.is_empty() {
            warn!(?history, "fee history response carried no base fees");
            return Err(EstimatorError::InvalidResponse);
        }
        history_base_fees.sort();

        let mut candidates = vec![
            pending_base_fee,
            projected_base_fee,
            percentile_rank(&history_base_fees, percentiles.slow),
            percentile_rank(&history_base_fees, percentiles.standard),
            percentile_rank(&history_base_fees, percentiles.fast),
        ];
        // Stable descending sort: equal candidates keep their relative order.
        candidates.sort_by(|a, b| b.cmp(a));
        debug!(?candidates, "merged base fee candidates");

        let gas_price = self.bounded(self.node.gas_price()).await?;

        let tier = |max_fee: U256, max_priority_fee: U256| GasFeeData {
            max_fee_per_gas: Some(max_fee),
            max_priority_fee_per_gas: Some(max_priority_fee),
            gas_price: Some(gas_price),
        };

        Ok(GasEstimation {
            fast: tier(candidates[0], rewards.fast),
            standard: tier(candidates[1], rewards.standard),
            slow: tier(candidates[2], rewards.slow),
        })
    }

    /// Races `fut` against the configured request timeout. Losing the race
    /// drops the request future, cancelling the round trip.
    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = match self.config.request_timeout {
            Some(timeout) => timeout,
            None => return fut.await,
        };
        futures_util::pin_mut!(fut);
        match future::select(fut, Delay::new(timeout)).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(EstimatorError::Timeout(timeout)),
        }
    }
}

/// Rank-based percentile selection over an ascending sorted slice: the entry
/// at `floor(len * percentile / 100)`, clamped to the last entry.
fn percentile_rank(sorted: &[U256], percentile: f64) -> U256 {
    let index = (sorted.len() as f64 * percentile / 100.0) as usize;
    sorted[index.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[u64]) -> Vec<U256> {
        values.iter().copied().map(U256::from).collect()
    }

    #[test]
    fn percentile_rank_indexes_by_rank() {
        let sorted = samples(&[10, 20, 30, 40, 50]);

        assert_eq!(percentile_rank(&sorted, 50.0), U256::from(30));
        assert_eq!(percentile_rank(&sorted, 10.0), U256::from(10));
        assert_eq!(percentile_rank(&sorted, 90.0), U256::from(50));
    }

    #[test]
    fn percentile_rank_clamps_to_last_entry() {
        let sorted = samples(&[7, 8]);
        assert_eq!(percentile_rank(&sorted, 100.0), U256::from(8));
    }

    #[test]
    fn descending_sort_is_stable() {
        let mut candidates = samples(&[5, 1, 5, 3]);
        candidates.sort_by(|a, b| b.cmp(a));
        assert_eq!(candidates, samples(&[5, 5, 3, 1]));
    }
}
