use ethers_core::types::U256;
use serde::{de::Deserializer, Deserialize, Serialize};
use std::str::FromStr;

/// The reward percentile thresholds backing the three speed tiers.
///
/// An immutable value: pass a fresh one to
/// [`FeeEstimator::estimate_with`](crate::FeeEstimator::estimate_with) rather
/// than mutating shared state between concurrent estimations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Percentiles {
    pub slow: f64,
    pub standard: f64,
    pub fast: f64,
}

impl Default for Percentiles {
    fn default() -> Self {
        Self { slow: 10.0, standard: 50.0, fast: 90.0 }
    }
}

impl Percentiles {
    /// The percentiles in the order the `eth_feeHistory` call expects them.
    pub(crate) fn as_array(&self) -> [f64; 3] {
        [self.slow, self.standard, self.fast]
    }
}

/// The gas accounting fields of a block header, as returned by
/// `eth_getBlockByNumber`. Fetched fresh per estimation, never cached.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockUsage {
    pub gas_used: U256,
    pub gas_limit: U256,
    /// Absent on pre-London blocks.
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
}

/// An `eth_feeHistory` response.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeHistory {
    pub base_fee_per_gas: Vec<U256>,
    #[serde(default)]
    pub gas_used_ratio: Vec<f64>,
    #[serde(deserialize_with = "from_int_or_hex")]
    /// oldestBlock is returned as an unsigned integer up to geth v1.10.6.
    /// From geth v1.10.7, this has been updated to return in the hex encoded
    /// form. The custom deserializer allows backward compatibility for those
    /// clients not running v1.10.7 yet.
    pub oldest_block: U256,
    /// Effective priority fee percentiles, one row per sampled block, one
    /// column per requested percentile. `None` when the node omitted the
    /// field entirely, which is distinct from an empty list of rows.
    #[serde(default)]
    pub reward: Option<Vec<Vec<U256>>>,
}

fn from_int_or_hex<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrHex {
        Int(u64),
        Hex(String),
    }
    match IntOrHex::deserialize(deserializer)? {
        IntOrHex::Int(n) => Ok(U256::from(n)),
        IntOrHex::Hex(s) => U256::from_str(s.as_str()).map_err(serde::de::Error::custom),
    }
}

/// One fee recommendation. Fields that do not apply to the tier's transaction
/// type are `None`, serialized as `null` — never zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFeeData {
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub gas_price: Option<U256>,
}

/// The three ranked fee recommendations produced by one estimation, ordered
/// `fast >= standard >= slow` on `max_fee_per_gas`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimation {
    pub fast: GasFeeData,
    pub standard: GasFeeData,
    pub slow: GasFeeData,
}
