//! Terminal front end for each command.

pub mod backtest;
pub mod dashboard;
pub mod link;
pub mod net_worth;
pub mod profile;
pub mod setup;
pub mod transactions;
pub mod ui;
