//! The shared aggregation service for the transaction ledger.
//!
//! Every read-side projection in the application goes through this module:
//! per-source balance derivation, transfer destination resolution, the
//! income/expense summary, and the in-memory transaction list the
//! projections are computed over. Keeping the logic in one place means every
//! caller sees the same numbers for the same list.
//!
//! All projection functions are pure: balances are never stored, they are
//! recomputed in full from the flat transaction list on every read.

mod balances;
mod cache;
mod summary;
#[cfg(test)]
pub(crate) mod test_fixtures;
mod transfer;

pub use balances::{SourceBalances, derive_balances};
pub use cache::TransactionCache;
pub use summary::{Summary, project_summary};
pub use transfer::{transfer_description, transfer_destination, transfer_title};
