use ethers_core::types::U256;

/// Projects the next block's base fee from the current block's utilization.
///
/// The protocol targets half-full blocks: when a block uses more gas than
/// `gas_limit / 2` the next base fee rises by up to 12.5%, otherwise it falls
/// by up to 12.5%. This projection applies the full adjustment in both
/// directions, so it is an upper bound on a rising fee and a lower bound on a
/// falling one. All arithmetic is integer, truncating.
pub fn next_base_fee(gas_used: U256, gas_limit: U256, base_fee_per_gas: U256) -> U256 {
    let target_gas_used = gas_limit / U256::from(2);
    if gas_used > target_gas_used {
        base_fee_per_gas * U256::from(1250) / U256::from(1000)
    } else {
        base_fee_per_gas * U256::from(875) / U256::from(1000)
    }
}
