//! Defines the core data model and database queries for savings goals.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{CategoryId, GoalId},
};

/// How urgently a goal should be funded, for display ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Nice to have.
    Low,
    /// The default priority.
    #[default]
    Medium,
    /// Fund this first.
    High,
}

impl Priority {
    fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|text| Self::parse(text).ok_or(FromSqlError::InvalidType))
    }
}

/// A savings target with either manually-entered or auto-tracked progress.
///
/// When `auto_update` is set and a category is linked, the goal's progress is
/// derived live from the transaction ledger (see [crate::goal::auto_progress])
/// and `current_amount` only serves as the manual fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    /// The ID of the goal.
    pub id: GoalId,
    /// A short human-readable label for the goal.
    pub title: String,
    /// A text description of what the goal is for.
    pub description: String,
    /// The amount to save up to.
    pub target_amount: f64,
    /// The manually-entered progress baseline.
    pub current_amount: f64,
    /// When the goal should be reached, if a deadline was set.
    pub target_date: Option<Date>,
    /// The free-text bucket the goal belongs to, e.g. "savings".
    pub category: String,
    /// How urgently the goal should be funded.
    pub priority: Priority,
    /// The category whose transactions feed the auto-tracked progress.
    pub linked_category_id: Option<CategoryId>,
    /// The name of the linked category, joined onto the row.
    pub linked_category_name: Option<String>,
    /// Whether progress is derived live from the ledger.
    pub auto_update: bool,
    /// When the goal row was created.
    pub created_at: OffsetDateTime,
}

fn default_goal_category() -> String {
    "savings".to_owned()
}

/// The request body for creating or updating a savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalBuilder {
    /// A short human-readable label for the goal.
    pub title: String,
    /// A text description of what the goal is for.
    #[serde(default)]
    pub description: String,
    /// The amount to save up to. Must not be negative.
    pub target_amount: f64,
    /// The manually-entered progress baseline. Must not be negative.
    #[serde(default)]
    pub current_amount: f64,
    /// When the goal should be reached, if a deadline was set.
    #[serde(default)]
    pub target_date: Option<Date>,
    /// The free-text bucket the goal belongs to.
    #[serde(default = "default_goal_category")]
    pub category: String,
    /// How urgently the goal should be funded.
    #[serde(default)]
    pub priority: Priority,
    /// The category whose transactions feed the auto-tracked progress.
    #[serde(default)]
    pub linked_category_id: Option<CategoryId>,
    /// Whether progress is derived live from the ledger.
    #[serde(default)]
    pub auto_update: bool,
}

impl GoalBuilder {
    /// Create a builder with the defaults the goal form applies.
    pub fn new(title: &str, target_amount: f64) -> Self {
        Self {
            title: title.to_owned(),
            description: String::new(),
            target_amount,
            current_amount: 0.0,
            target_date: None,
            category: default_goal_category(),
            priority: Priority::default(),
            linked_category_id: None,
            auto_update: false,
        }
    }

    /// Link the goal to a category and enable auto-tracked progress.
    pub fn auto_track(mut self, linked_category_id: CategoryId) -> Self {
        self.linked_category_id = Some(linked_category_id);
        self.auto_update = true;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.target_amount < 0.0 {
            return Err(Error::NegativeAmount(self.target_amount));
        }
        if self.current_amount < 0.0 {
            return Err(Error::NegativeAmount(self.current_amount));
        }

        Ok(())
    }
}

const JOINED_SELECT: &str = "SELECT financial_goal.id, title, financial_goal.description, \
     target_amount, current_amount, target_date, financial_goal.category, priority, \
     linked_category_id, category.name, auto_update, financial_goal.created_at \
     FROM financial_goal LEFT JOIN category ON financial_goal.linked_category_id = category.id";

/// Create a new savings goal in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the target or current amount is negative,
/// - or [Error::InvalidCategory] if the linked category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_goal(builder: GoalBuilder, connection: &Connection) -> Result<SavingsGoal, Error> {
    builder.validate()?;

    connection
        .execute(
            "INSERT INTO financial_goal \
             (title, description, target_amount, current_amount, target_date, category, \
              priority, linked_category_id, auto_update, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            (
                &builder.title,
                &builder.description,
                builder.target_amount,
                builder.current_amount,
                builder.target_date,
                &builder.category,
                builder.priority,
                builder.linked_category_id,
                builder.auto_update,
                OffsetDateTime::now_utc(),
            ),
        )
        .map_err(|error| map_category_constraint(error, builder.linked_category_id))?;

    get_goal(connection.last_insert_rowid(), connection)
}

/// Retrieve a savings goal by its `id`, with its linked category name joined
/// on.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid goal,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_goal(id: GoalId, connection: &Connection) -> Result<SavingsGoal, Error> {
    let goal = connection
        .prepare(&format!("{JOINED_SELECT} WHERE financial_goal.id = :id"))?
        .query_one(&[(":id", &id)], map_goal_row)?;

    Ok(goal)
}

/// Retrieve all savings goals, newest first, with linked category names
/// joined on.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_goals(connection: &Connection) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(&format!(
            "{JOINED_SELECT} ORDER BY financial_goal.created_at DESC, financial_goal.id DESC"
        ))?
        .query_map([], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the savings goal `id` with the contents of `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingGoal] if `id` does not refer to a valid goal,
/// - or any error from the same validations as [create_goal].
pub fn update_goal(
    id: GoalId,
    builder: GoalBuilder,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    builder.validate()?;

    let rows_affected = connection
        .execute(
            "UPDATE financial_goal SET \
             title = ?1, description = ?2, target_amount = ?3, current_amount = ?4, \
             target_date = ?5, category = ?6, priority = ?7, linked_category_id = ?8, \
             auto_update = ?9 \
             WHERE id = ?10",
            (
                &builder.title,
                &builder.description,
                builder.target_amount,
                builder.current_amount,
                builder.target_date,
                &builder.category,
                builder.priority,
                builder.linked_category_id,
                builder.auto_update,
                id,
            ),
        )
        .map_err(|error| map_category_constraint(error, builder.linked_category_id))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    get_goal(id, connection)
}

/// Set the manually-entered progress baseline of the goal `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if `current_amount` is negative,
/// - or [Error::UpdateMissingGoal] if `id` does not refer to a valid goal,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_current_amount(
    id: GoalId,
    current_amount: f64,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    if current_amount < 0.0 {
        return Err(Error::NegativeAmount(current_amount));
    }

    let rows_affected = connection.execute(
        "UPDATE financial_goal SET current_amount = ?1 WHERE id = ?2",
        (current_amount, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    get_goal(id, connection)
}

/// Delete the savings goal `id` and return the deleted row.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingGoal] if `id` does not refer to a valid goal,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_goal(id: GoalId, connection: &Connection) -> Result<SavingsGoal, Error> {
    let goal = get_goal(id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingGoal,
        error => error,
    })?;

    connection.execute("DELETE FROM financial_goal WHERE id = ?1", [id])?;

    Ok(goal)
}

/// Create the financial goal table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_goal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                target_amount REAL NOT NULL CHECK (target_amount >= 0),
                current_amount REAL NOT NULL DEFAULT 0 CHECK (current_amount >= 0),
                target_date TEXT,
                category TEXT NOT NULL DEFAULT 'savings',
                priority TEXT NOT NULL DEFAULT 'medium'
                    CHECK (priority IN ('low', 'medium', 'high')),
                linked_category_id INTEGER,
                auto_update INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY(linked_category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        target_date: row.get(5)?,
        category: row.get(6)?,
        priority: row.get(7)?,
        linked_category_id: row.get(8)?,
        linked_category_name: row.get(9)?,
        auto_update: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn map_category_constraint(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCategory(category_id),
        error => error.into(),
    }
}
