use super::ui;
use crate::core::backtest::{BacktestApi, BacktestRequest, BacktestResult, OrderSide};
use crate::core::format::{
    DEFAULT_PRECISION, NOT_AVAILABLE, format_currency, format_number, format_percentage,
};
use anyhow::{Context, Result};
use comfy_table::{Cell, Color};
use tracing::info;

/// How many orders the results view lists.
const ORDERS_SHOWN: usize = 10;

impl BacktestResult {
    pub fn display_as_table(&self, request: &BacktestRequest) -> String {
        let stats = &self.statistics;

        let mut metrics = ui::new_styled_table();
        metrics.set_header(vec![
            ui::header_cell("Total Return"),
            ui::header_cell("Annual Return"),
            ui::header_cell("Sharpe Ratio"),
            ui::header_cell("Max Drawdown"),
            ui::header_cell("Win Rate"),
        ]);
        metrics.add_row(vec![
            ui::signed_cell(stats.total_return, format_percentage(stats.total_return)),
            ui::signed_cell(stats.annual_return, format_percentage(stats.annual_return)),
            ui::value_cell(format_number(stats.sharpe_ratio, DEFAULT_PRECISION)),
            ui::value_cell(format_percentage(stats.max_drawdown)),
            ui::value_cell(format_percentage(stats.win_rate)),
        ]);

        let mut output = format!(
            "{}\n{}\n\n",
            ui::style_text(
                &format!("Backtest Results: {}", request.symbol),
                ui::StyleType::Title
            ),
            ui::style_text(
                &format!(
                    "{} to {}, cash at risk {}",
                    request.start_date,
                    request.end_date,
                    format_percentage(Some(request.cash_at_risk))
                ),
                ui::StyleType::Subtle
            )
        );
        output.push_str(&metrics.to_string());

        if let Some(final_value) = self.final_portfolio_value() {
            output.push_str(&format!(
                "\n\n{}: {}",
                ui::style_text("Final Portfolio Value", ui::StyleType::TotalLabel),
                ui::style_text(
                    &format_currency(final_value, "USD"),
                    ui::StyleType::TotalValue
                )
            ));
        }

        if self.orders().is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    "No orders were executed during this backtest period",
                    ui::StyleType::Subtle
                )
            ));
            return output;
        }

        let mut orders = ui::new_styled_table();
        orders.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Side"),
            ui::header_cell("Quantity"),
            ui::header_cell("Price"),
        ]);
        for order in self.recent_orders(ORDERS_SHOWN) {
            let side_color = match order.side {
                OrderSide::Buy => Color::Green,
                OrderSide::Sell => Color::Red,
            };
            let date = order
                .date()
                .map(|d| d.format("%m/%d/%Y").to_string())
                .unwrap_or_else(|| order.created_at.clone());
            let price = order
                .price
                .map(|p| format_currency(p, "USD"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            orders.add_row(vec![
                Cell::new(date),
                Cell::new(order.side.to_string()).fg(side_color),
                ui::value_cell(order.quantity.to_string()),
                ui::value_cell(price),
            ]);
        }

        output.push_str(&format!(
            "\n\n{}\n",
            ui::style_text(
                &format!(
                    "Orders (first {} of {})",
                    self.recent_orders(ORDERS_SHOWN).len(),
                    self.orders().len()
                ),
                ui::StyleType::TotalLabel
            )
        ));
        output.push_str(&orders.to_string());
        output
    }
}

pub async fn run(api: &dyn BacktestApi, request: BacktestRequest) -> Result<()> {
    request.validate().context("Invalid backtest parameters")?;
    info!(symbol = %request.symbol, "Running backtest");

    let pb = ui::new_spinner("Running backtest...");
    let result = api.run_backtest(&request).await;
    pb.finish_and_clear();
    let result = result.context("Backtest failed")?;

    println!("{}", result.display_as_table(&request));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backtest::{Order, Performance, Statistics};
    use std::collections::BTreeMap;

    fn result_with_orders(count: usize) -> BacktestResult {
        BacktestResult {
            performance: Performance {
                portfolio_value: BTreeMap::from([
                    ("2020-01-02".to_string(), 100000.0),
                    ("2023-12-29".to_string(), 115250.0),
                ]),
            },
            statistics: Statistics {
                total_return: Some(0.1525),
                annual_return: Some(0.0364),
                sharpe_ratio: Some(0.81234),
                max_drawdown: Some(-0.1),
                win_rate: None,
            },
            orders: Some(
                (0..count)
                    .map(|i| Order {
                        created_at: format!("2020-02-{:02}T15:00:00+00:00", i + 1),
                        side: if i % 2 == 0 {
                            OrderSide::Buy
                        } else {
                            OrderSide::Sell
                        },
                        quantity: 10.0,
                        price: Some(320.5),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_display_metrics() {
        let output = result_with_orders(0).display_as_table(&BacktestRequest::default());
        assert!(output.contains("15.25%"));
        assert!(output.contains("3.64%"));
        assert!(output.contains("0.8123"));
        assert!(output.contains("-10.00%"));
        assert!(output.contains("N/A"));
        assert!(output.contains("$115,250.00"));
        assert!(output.contains("No orders were executed"));
    }

    #[test]
    fn test_display_orders_capped() {
        let output = result_with_orders(12).display_as_table(&BacktestRequest::default());
        assert!(output.contains("Orders (first 10 of 12)"));
        assert!(output.contains("BUY"));
        assert!(output.contains("SELL"));
        assert!(output.contains("$320.50"));
        assert!(output.contains("02/10/2020"));
        assert!(!output.contains("02/11/2020"));
    }
}
