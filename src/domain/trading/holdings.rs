use crate::domain::trading::types::OrderSide;
use std::collections::BTreeMap;

/// Net units from a sequence of (side, volume) fills: Σ BUY − Σ SELL.
pub fn net_position<I>(fills: I) -> i64
where
    I: IntoIterator<Item = (OrderSide, u64)>,
{
    fills
        .into_iter()
        .fold(0i64, |acc, (side, volume)| acc.saturating_add(side.signed(volume)))
}

/// Holdings are never reported below zero.
pub fn clamp_holding(net: i64) -> u64 {
    u64::try_from(net).unwrap_or(0)
}

/// Keeps only strictly positive positions, keyed by ticker.
pub fn positive_positions<I>(nets: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = (String, i64)>,
{
    nets.into_iter()
        .filter(|(_, net)| *net > 0)
        .map(|(ticker, net)| (ticker, clamp_holding(net)))
        .collect()
}
