//! Defines the core data model and database queries for categories.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId};

/// Which kinds of transaction a category can classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Classifies income transactions only.
    Income,
    /// Classifies expense transactions only.
    Expense,
    /// Classifies both income and expense transactions.
    Both,
}

impl CategoryKind {
    fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Both => "both",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "income" => Some(CategoryKind::Income),
            "expense" => Some(CategoryKind::Expense),
            "both" => Some(CategoryKind::Both),
            _ => None,
        }
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|text| Self::parse(text).ok_or(FromSqlError::InvalidType))
    }
}

/// A non-empty category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, rejecting empty or whitespace-only strings.
    ///
    /// # Errors
    /// Returns [Error::EmptyCategoryName] if `name` has no non-whitespace
    /// characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::EmptyCategoryName);
        }

        Ok(Self(name.to_owned()))
    }

    /// Create a category name without validation, e.g. when reading a value
    /// that was validated before it was stored.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label for grouping transactions, e.g. "Groceries", "Salary".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category. Unique.
    pub name: CategoryName,
    /// Which kinds of transaction the category classifies.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// The icon identifier shown next to the category.
    pub icon: String,
    /// The display color for the category.
    pub color: String,
}

/// The request body for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBuilder {
    /// The display name of the category.
    pub name: String,
    /// Which kinds of transaction the category classifies.
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// The icon identifier shown next to the category.
    #[serde(default)]
    pub icon: String,
    /// The display color for the category.
    #[serde(default)]
    pub color: String,
}

impl CategoryBuilder {
    /// Create a builder with an empty icon and color.
    pub fn new(name: &str, kind: CategoryKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            icon: String::new(),
            color: String::new(),
        }
    }
}

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the name has no non-whitespace characters,
/// - or [Error::DuplicateCategoryName] if a category with the name already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(builder: CategoryBuilder, connection: &Connection) -> Result<Category, Error> {
    let name = CategoryName::new(&builder.name)?;

    connection
        .execute(
            "INSERT INTO category (name, kind, icon, color) VALUES (?1, ?2, ?3, ?4)",
            (name.as_ref(), builder.kind, &builder.icon, &builder.color),
        )
        .map_err(|error| map_duplicate_name(error, &builder.name))?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        name,
        kind: builder.kind,
        icon: builder.icon,
        color: builder.color,
    })
}

/// Retrieve a single category by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, kind, icon, color FROM category WHERE id = :id;")?
        .query_one(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, kind, icon, color FROM category ORDER BY name ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the category `id` with the contents of `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingCategory] if `id` does not refer to a valid category,
/// - or any error from the same validations as [create_category].
pub fn update_category(
    category_id: CategoryId,
    builder: CategoryBuilder,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = CategoryName::new(&builder.name)?;

    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, kind = ?2, icon = ?3, color = ?4 WHERE id = ?5",
            (
                name.as_ref(),
                builder.kind,
                &builder.icon,
                &builder.color,
                category_id,
            ),
        )
        .map_err(|error| map_duplicate_name(error, &builder.name))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(Category {
        id: category_id,
        name,
        kind: builder.kind,
        icon: builder.icon,
        color: builder.color,
    })
}

/// Delete a category by ID and return the deleted row.
///
/// Transactions and goals referencing the category keep their rows; the
/// reference is cleared by the schema.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `id` does not refer to a valid category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    let category = get_category(category_id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingCategory,
        error => error,
    })?;

    connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    Ok(category)
}

/// Initialize the category table and indexes.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense', 'both')),
            icon TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        kind: row.get(2)?,
        icon: row.get(3)?,
        color: row.get(4)?,
    })
}

fn map_duplicate_name(error: rusqlite::Error, name: &str) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategoryName(name.to_owned()),
        error => error.into(),
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let category_name = CategoryName::new("\n\t \r");

        assert_eq!(category_name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let category_name = CategoryName::new("🛒");

        assert!(category_name.is_ok())
    }
}
