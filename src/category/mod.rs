//! Category management: the `Category` model, database functions, and JSON
//! endpoints. Categories classify transactions and can feed a savings goal's
//! auto-tracked progress.

mod core;
mod endpoints;

pub use core::{
    Category, CategoryBuilder, CategoryKind, CategoryName, create_category_table, delete_category,
    get_all_categories, get_category,
};
pub(crate) use core::{create_category, update_category};

pub(crate) use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    update_category_endpoint,
};

pub use crate::database_id::CategoryId;
