//! gestock-service: the domain layer over the record store.
//!
//! Every mutating operation goes through one of the managers here; views and
//! exports consume their read projections. The store behind them is any
//! [`gestock_core::traits::RecordStore`] — SQLite in production, an in-memory
//! stub in unit tests.

pub mod auth;
pub mod ledger;
pub mod lifecycle;
pub mod registry;
pub mod reports;

pub use auth::{Access, AuthorizationGuard, Session};
pub use ledger::InventoryLedger;
pub use lifecycle::{HistoryFilter, RequestLifecycle};
pub use registry::UserRegistry;
pub use reports::{DashboardStats, FicheRetrait, Reporting, StockExportRow};
