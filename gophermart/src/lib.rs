//! Wires the identity, order, ledger and reconciliation-worker services to
//! a `database::Store` and exposes them over the HTTP surface in [`api`].
//! `main.rs` is the only thing that knows how to construct a
//! `PostgresStore` and an `accrual_client::AccrualClient`; everything in
//! this library talks to the trait objects only.
pub mod api;
pub mod identity;
pub mod ledger;
pub mod orders;
pub mod worker;

pub use identity::{IdentityError, IdentityService};
pub use ledger::{LedgerError, LedgerService};
pub use orders::{OrderError, OrderService};
pub use worker::ReconciliationWorker;
