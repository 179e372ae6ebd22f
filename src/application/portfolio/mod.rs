pub mod holdings_calculator;

pub use holdings_calculator::HoldingsCalculator;
