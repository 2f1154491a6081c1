use super::ui;
use crate::core::format::format_signed_amount;
use crate::core::snapshot::{SnapshotApi, TransactionRefresher, TransactionSnapshot};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::sync::Arc;

const EMPTY_MESSAGE: &str = "No transactions yet. Connect your bank account to get started.";

impl TransactionSnapshot {
    pub fn display_as_table(&self, limit: usize, currency: &str) -> String {
        if self.is_empty() {
            return ui::style_text(EMPTY_MESSAGE, ui::StyleType::Subtle);
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Name"),
            ui::header_cell("Category"),
            ui::header_cell(&format!("Amount ({currency})")),
            ui::header_cell("Status"),
        ]);

        for txn in self.recent(limit) {
            let status = if txn.pending {
                Cell::new("Pending").fg(comfy_table::Color::Yellow)
            } else {
                Cell::new("Posted")
            };
            table.add_row(vec![
                Cell::new(txn.date.format("%m/%d/%Y")),
                Cell::new(&txn.name),
                Cell::new(txn.category.as_deref().unwrap_or("Uncategorized")),
                ui::amount_cell(txn.amount, format_signed_amount(txn.amount, currency)),
                status,
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Recent Transactions", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let pending = self.pending_count();
        if pending > 0 {
            output.push_str(&format!("\n{pending} pending"));
        }

        let shown = self.recent(limit).len();
        if shown < self.transactions.len() {
            output.push_str(&ui::style_text(
                &format!(
                    "\nShowing {shown} of {} transactions",
                    self.transactions.len()
                ),
                ui::StyleType::Subtle,
            ));
        }
        output.push('\n');
        output.push_str(&ui::fetched_at_line(self.fetched_at));
        output
    }
}

pub async fn run(api: Arc<dyn SnapshotApi>, limit: usize, currency: &str) -> Result<()> {
    let refresher = TransactionRefresher::new(api);

    let pb = ui::new_spinner("Fetching transactions...");
    let snapshot = refresher.fetch_snapshot().await;
    pb.finish_and_clear();
    let snapshot = snapshot.context("Failed to fetch transactions")?;

    println!("{}", snapshot.display_as_table(limit, currency));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core::snapshot::{Transaction, TransactionSnapshot};
    use chrono::{NaiveDate, Utc};

    fn snapshot(count: usize) -> TransactionSnapshot {
        TransactionSnapshot {
            transactions: (0..count)
                .map(|i| Transaction {
                    id: format!("t{i}"),
                    date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                    name: format!("Store {i}"),
                    amount: if i == 0 { -100.0 } else { 12.5 },
                    category: None,
                    pending: i == 1,
                })
                .collect(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_snapshot_message() {
        let output = snapshot(0).display_as_table(5, "USD");
        assert!(output.contains("No transactions yet"));
    }

    #[test]
    fn test_table_contents() {
        let output = snapshot(7).display_as_table(5, "USD");
        assert!(output.contains("Store 0"));
        assert!(output.contains("Store 4"));
        assert!(!output.contains("Store 5"));
        assert!(output.contains("+$100.00"));
        assert!(output.contains("$12.50"));
        assert!(output.contains("Pending"));
        assert!(output.contains("Uncategorized"));
        assert!(output.contains("03/09/2024"));
        assert!(output.contains("Showing 5 of 7 transactions"));
        assert!(output.contains("1 pending"));
        assert!(output.contains("Fetched at "));
    }
}
