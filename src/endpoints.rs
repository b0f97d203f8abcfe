//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}',
//! use [format_endpoint].

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list transactions grouped into date buckets.
pub const GROUPED_TRANSACTIONS: &str = "/api/transactions/grouped";
/// The route to move money between sources.
pub const TRANSFERS: &str = "/api/transfers";
/// The route for the derived per-source balances.
pub const BALANCES: &str = "/api/balances";
/// The route for the derived income/expense/balance summary.
pub const SUMMARY: &str = "/api/summary";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to update or delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create savings goals.
pub const GOALS: &str = "/api/goals";
/// The route to update or delete a single savings goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to manually set a savings goal's progress.
pub const GOAL_PROGRESS: &str = "/api/goals/{goal_id}/progress";
/// The route to poll for row-level change events.
pub const EVENTS: &str = "/api/events";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/goals/{goal_id}', '{goal_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
