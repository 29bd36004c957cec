//! Smart trolley dashboard
//!
//! Polls an RFID scan log, turns it into a priced bill and lets the
//! operator take single scans back out.
//!
//! ```text
//! LogStore::get_all → summarize(catalog, snapshot) → DashboardState → ui
//!                                   ↓
//!                               KeyIndex → Aggregator::delete_one → LogStore::delete
//! ```


pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod state;
pub mod store;
pub mod ui;

pub use aggregator::{summarize, Aggregator, ItemSummaryRow, KeyIndex, Removal, Summary};
pub use catalog::{Catalog, CatalogItem};
pub use config::Config;
pub use store::{LogStore, ScanEvent, Snapshot, StoreError};
