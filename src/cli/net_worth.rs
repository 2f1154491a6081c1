use super::ui;
use crate::core::format::format_currency;
use crate::core::snapshot::{NetWorth, NetWorthRefresher, NetWorthSnapshot, SnapshotApi};
use anyhow::{Context, Result};
use comfy_table::{Cell, Color};
use std::sync::Arc;

impl NetWorth {
    pub fn display_as_table(&self) -> String {
        let currency = &self.currency;

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Account"),
            ui::header_cell(&format!("Balance ({currency})")),
        ]);

        for account in &self.accounts {
            table.add_row(vec![
                Cell::new(&account.name),
                ui::value_cell(format_currency(account.balance, currency)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Assets"),
            ui::value_cell(format_currency(self.total_assets, currency)),
        ]);
        table.add_row(vec![
            Cell::new("Debts").fg(Color::Red),
            ui::value_cell(format_currency(self.total_debts, currency)).fg(Color::Red),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Net Worth", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\nNet Worth ({}): {}\n{}",
            ui::style_text(currency, ui::StyleType::TotalLabel),
            ui::style_text(
                &format_currency(self.net_worth, currency),
                ui::StyleType::TotalValue
            ),
            ui::style_text(
                &format!("Last updated: {}", self.last_updated),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

impl NetWorthSnapshot {
    pub fn display_as_table(&self) -> String {
        format!(
            "{}\n{}",
            self.net_worth.display_as_table(),
            ui::fetched_at_line(self.fetched_at)
        )
    }
}

pub async fn run(api: Arc<dyn SnapshotApi>) -> Result<()> {
    let refresher = NetWorthRefresher::new(api);

    let pb = ui::new_spinner("Fetching net worth...");
    let snapshot = refresher.fetch_snapshot().await;
    pb.finish_and_clear();
    let snapshot = snapshot.context("Failed to load net worth data")?;

    println!("{}", snapshot.display_as_table());
    Ok(())
}
