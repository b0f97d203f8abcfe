//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its enums, and `TransactionBuilder`
//! - Database functions for storing, querying, and managing transactions
//! - JSON endpoints for transaction CRUD and transfers
//! - Read-side filter and date-grouping projections

mod core;
mod create_endpoint;
mod delete_endpoint;
mod filter;
mod grouping;
mod list_endpoint;
mod transfer_endpoint;
mod update_endpoint;

pub use core::{
    PaymentMethod, Source, Transaction, TransactionBuilder, TransactionKind,
    create_transaction_table,
};
pub(crate) use core::{
    create_transaction, delete_transaction, get_all_transactions, get_transaction,
    update_transaction,
};
pub use filter::{TransactionFilter, TypeLabel};
pub use grouping::{DateGroup, group_by_date};

pub(crate) use create_endpoint::create_transaction_endpoint;
pub(crate) use delete_endpoint::delete_transaction_endpoint;
pub(crate) use list_endpoint::{get_grouped_transactions_endpoint, get_transactions_endpoint};
pub(crate) use transfer_endpoint::create_transfer_endpoint;
pub(crate) use update_endpoint::update_transaction_endpoint;

pub use crate::database_id::TransactionId;
