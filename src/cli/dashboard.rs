use super::ui;
use crate::core::snapshot::{NetWorthRefresher, SnapshotApi, TransactionRefresher};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::warn;

/// Shows net worth and recent transactions side by side.
///
/// Both snapshots are fetched concurrently; one failing does not hide the other.
pub async fn run(api: Arc<dyn SnapshotApi>, limit: usize, currency: &str) -> Result<()> {
    let net_worth = NetWorthRefresher::new(Arc::clone(&api));
    let transactions = TransactionRefresher::new(api);

    let pb = ui::new_spinner("Refreshing dashboard...");
    let (net_worth, transactions) =
        futures::join!(net_worth.fetch_snapshot(), transactions.fetch_snapshot());
    pb.finish_and_clear();

    let mut failures = 0;

    match &net_worth {
        Ok(snapshot) => println!("{}", snapshot.display_as_table()),
        Err(e) => {
            warn!(error = %e, "Net worth unavailable");
            failures += 1;
            println!(
                "{}",
                ui::style_text(
                    &format!("Failed to load net worth data: {e}"),
                    ui::StyleType::Error
                )
            );
        }
    }

    ui::print_separator();

    match &transactions {
        Ok(snapshot) => println!("{}", snapshot.display_as_table(limit, currency)),
        Err(e) => {
            warn!(error = %e, "Transactions unavailable");
            failures += 1;
            println!(
                "{}",
                ui::style_text(
                    &format!("Failed to load transactions: {e}"),
                    ui::StyleType::Error
                )
            );
        }
    }

    if failures == 2 {
        bail!("Dashboard data is unavailable");
    }
    Ok(())
}
