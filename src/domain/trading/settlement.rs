//! Order settlement rules.
//!
//! Both ledger stores call [`settle`] from inside their atomic unit of work,
//! after they have locked the account and read the committed balance,
//! holdings and price. Nothing here touches storage.

use crate::domain::errors::LedgerError;
use crate::domain::trading::types::OrderSide;
use rust_decimal::Decimal;

/// Snapshot of the state an order is validated against
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementInput<'a> {
    pub ticker: &'a str,
    pub side: OrderSide,
    pub volume: u64,
    pub price: Decimal,
    pub balance: Decimal,
    pub holdings: u64,
}

/// Outcome of an accepted order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub execution_price: Decimal,
    pub new_balance: Decimal,
}

pub fn settle(input: &SettlementInput<'_>) -> Result<Settlement, LedgerError> {
    if input.volume == 0 {
        return Err(LedgerError::InvalidVolume(0));
    }
    if input.price <= Decimal::ZERO {
        return Err(LedgerError::NotTradable {
            ticker: input.ticker.to_string(),
        });
    }

    let execution_price = input.price * Decimal::from(input.volume);

    let new_balance = match input.side {
        OrderSide::Buy => {
            if input.balance < execution_price {
                return Err(LedgerError::InsufficientBalance {
                    required: execution_price,
                    available: input.balance,
                });
            }
            input.balance - execution_price
        }
        OrderSide::Sell => {
            if input.holdings < input.volume {
                return Err(LedgerError::InsufficientHoldings {
                    ticker: input.ticker.to_string(),
                    requested: input.volume,
                    available: input.holdings,
                });
            }
            input.balance + execution_price
        }
    };

    Ok(Settlement {
        execution_price,
        new_balance,
    })
}
