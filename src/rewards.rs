use crate::{types::FeeHistory, EstimatorError, Result};
use ethers_core::types::U256;
use tracing::{debug, warn};

/// Per-tier averages of the historical reward percentiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardAverages {
    pub slow: U256,
    pub standard: U256,
    pub fast: U256,
}

/// Averages the reward percentile columns of a fee history response into one
/// value per tier.
///
/// A row is skipped when it is shorter than three entries or when any of its
/// three percentile values is zero — nodes report all zeroes for blocks they
/// have no reward data for, and folding those rows in would drag the average
/// toward zero. Each remaining column sum is divided by the count of rows
/// kept (integer division). When every row was skipped the zero sums are
/// returned unchanged.
///
/// Fails with [`EstimatorError::InvalidResponse`] when the history carries no
/// reward list at all.
pub fn average_rewards(history: &FeeHistory) -> Result<RewardAverages> {
    let rows = match &history.reward {
        Some(rows) => rows,
        None => {
            warn!(?history, "fee history response carried no reward list");
            return Err(EstimatorError::InvalidResponse);
        }
    };

    let mut averages = RewardAverages::default();
    let mut valid_rows = 0u64;
    for row in rows {
        match row.as_slice() {
            [slow, standard, fast, ..]
                if !slow.is_zero() && !standard.is_zero() && !fast.is_zero() =>
            {
                averages.slow += *slow;
                averages.standard += *standard;
                averages.fast += *fast;
                valid_rows += 1;
            }
            _ => debug!(?row, "skipping empty or incomplete reward row"),
        }
    }

    if valid_rows > 0 {
        let count = U256::from(valid_rows);
        averages.slow /= count;
        averages.standard /= count;
        averages.fast /= count;
    }

    Ok(averages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with_rewards(rows: Vec<Vec<u64>>) -> FeeHistory {
        FeeHistory {
            reward: Some(
                rows.into_iter()
                    .map(|row| row.into_iter().map(U256::from).collect())
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn averages_each_column() {
        let history = history_with_rewards(vec![vec![1, 2, 3], vec![3, 6, 9]]);
        let averages = average_rewards(&history).unwrap();

        assert_eq!(averages.slow, U256::from(2));
        assert_eq!(averages.standard, U256::from(4));
        assert_eq!(averages.fast, U256::from(6));
    }

    #[test]
    fn average_is_truncating() {
        let history = history_with_rewards(vec![vec![1, 1, 1], vec![2, 2, 2]]);
        let averages = average_rewards(&history).unwrap();

        // (1 + 2) / 2 = 1 with integer division.
        assert_eq!(averages.slow, U256::from(1));
    }

    #[test]
    fn rows_with_any_zero_are_skipped() {
        let history =
            history_with_rewards(vec![vec![1, 2, 3], vec![0, 5, 6], vec![4, 0, 12], vec![7, 8, 0]]);
        let averages = average_rewards(&history).unwrap();

        assert_eq!(averages.slow, U256::from(1));
        assert_eq!(averages.standard, U256::from(2));
        assert_eq!(averages.fast, U256::from(3));
    }

    #[test]
    fn short_rows_are_skipped() {
        let history = history_with_rewards(vec![vec![9, 9], vec![2, 4, 8]]);
        let averages = average_rewards(&history).unwrap();

        assert_eq!(averages.slow, U256::from(2));
        assert_eq!(averages.standard, U256::from(4));
        assert_eq!(averages.fast, U256::from(8));
    }

    #[test]
    fn all_rows_invalid_yields_zeroes() {
        let history = history_with_rewards(vec![vec![0, 0, 0], vec![1, 0, 3]]);
        let averages = average_rewards(&history).unwrap();

        assert_eq!(averages, RewardAverages::default());
    }

    #[test]
    fn no_rows_yields_zeroes() {
        let history = history_with_rewards(vec![]);
        assert_eq!(average_rewards(&history).unwrap(), RewardAverages::default());
    }

    #[test]
    fn missing_reward_list_is_an_invalid_response() {
        let history = FeeHistory::default();
        assert!(matches!(average_rewards(&history), Err(EstimatorError::InvalidResponse)));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let history = history_with_rewards(vec![vec![1, 2, 3, 4, 5]]);
        let averages = average_rewards(&history).unwrap();

        assert_eq!(averages.fast, U256::from(3));
    }
}
