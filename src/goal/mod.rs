//! Savings goal management: the `SavingsGoal` model, database functions,
//! JSON endpoints, and the auto-tracked progress calculation.

mod core;
mod endpoints;
mod progress;

pub use core::{GoalBuilder, Priority, SavingsGoal, create_goal_table};
pub(crate) use core::{create_goal, delete_goal, get_all_goals, get_goal, set_current_amount, update_goal};
pub use progress::{
    GoalProgress, GoalView, auto_progress, goal_view, progress_percent, remaining_amount,
};

pub(crate) use endpoints::{
    create_goal_endpoint, delete_goal_endpoint, get_goals_endpoint, set_goal_progress_endpoint,
    update_goal_endpoint,
};

pub use crate::database_id::GoalId;
