//! Strategy backtest request and result types.
//!
//! The backtest itself runs on the backend; this side validates the request
//! and reads the result for display.

use super::error::{ClientError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

pub const MIN_CASH_AT_RISK: f64 = 0.1;
pub const MAX_CASH_AT_RISK: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Fraction of available cash the strategy may put into one trade.
    pub cash_at_risk: f64,
}

impl Default for BacktestRequest {
    fn default() -> Self {
        BacktestRequest {
            symbol: "SPY".to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            cash_at_risk: 0.5,
        }
    }
}

impl BacktestRequest {
    pub fn validate(&self) -> Result<()> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(ClientError::Validation("Symbol is required".into()));
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ClientError::Validation(format!(
                "Invalid symbol: {symbol}"
            )));
        }
        if self.start_date > self.end_date {
            return Err(ClientError::Validation(format!(
                "Start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        if !(MIN_CASH_AT_RISK..=MAX_CASH_AT_RISK).contains(&self.cash_at_risk) {
            return Err(ClientError::Validation(format!(
                "Cash at risk must be between {MIN_CASH_AT_RISK} and {MAX_CASH_AT_RISK}, got {}",
                self.cash_at_risk
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_return: Option<f64>,
    pub annual_return: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub win_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Portfolio value keyed by date string.
    #[serde(default)]
    pub portfolio_value: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    #[serde(alias = "BUY")]
    Buy,
    #[serde(alias = "SELL")]
    Sell,
}

impl Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OrderSide::Buy => "BUY",
                OrderSide::Sell => "SELL",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub created_at: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub price: Option<f64>,
}

impl Order {
    /// Calendar date of the order, if `created_at` is a recognisable timestamp.
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.created_at.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| raw.get(..10).and_then(|d| d.parse::<NaiveDate>().ok()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(default)]
    pub performance: Performance,
    #[serde(default)]
    pub statistics: Statistics,
    #[serde(default)]
    pub orders: Option<Vec<Order>>,
}

impl BacktestResult {
    pub fn orders(&self) -> &[Order] {
        self.orders.as_deref().unwrap_or_default()
    }

    /// The first `count` orders, in the order the backend listed them.
    pub fn recent_orders(&self, count: usize) -> &[Order] {
        let orders = self.orders();
        &orders[..count.min(orders.len())]
    }

    /// Portfolio value on the latest date in the performance series.
    pub fn final_portfolio_value(&self) -> Option<f64> {
        self.performance
            .portfolio_value
            .iter()
            .next_back()
            .map(|(_, v)| *v)
    }
}

#[async_trait]
pub trait BacktestApi: Send + Sync {
    async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResult>;
}
