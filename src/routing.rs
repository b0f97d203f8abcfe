//! Application router configuration for the JSON API.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState, Error,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        update_category_endpoint,
    },
    dashboard::{get_balances_endpoint, get_summary_endpoint},
    endpoints,
    feed::get_events_endpoint,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, get_goals_endpoint, set_goal_progress_endpoint,
        update_goal_endpoint,
    },
    transaction::{
        create_transaction_endpoint, create_transfer_endpoint, delete_transaction_endpoint,
        get_grouped_transactions_endpoint, get_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::GROUPED_TRANSACTIONS,
            get(get_grouped_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::TRANSFERS, post(create_transfer_endpoint))
        .route(endpoints::BALANCES, get(get_balances_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::GOALS,
            get(get_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            put(update_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(endpoints::GOAL_PROGRESS, put(set_goal_progress_endpoint))
        .route(endpoints::EVENTS, get(get_events_endpoint))
        .fallback(get_not_found)
        .with_state(state)
}

async fn get_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod api_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, build_router, endpoints, endpoints::format_endpoint};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection).unwrap();
        let router = build_router(state);

        TestServer::new(router).expect("Could not create test server.")
    }

    async fn post_transaction(server: &TestServer, body: Value) -> Value {
        let response = server.post(endpoints::TRANSACTIONS).json(&body).await;
        response.assert_status(axum::http::StatusCode::CREATED);

        response.json::<Value>()
    }

    /// Seeds the worked example: income 1000 to the wallet, a 300 cash
    /// expense from the wallet, and a 200 transfer from the wallet to the
    /// bank.
    async fn seed_worked_example(server: &TestServer) {
        post_transaction(
            server,
            json!({
                "title": "Salary",
                "amount": 1000.0,
                "type": "income",
                "income_source": "wallet",
                "transaction_date": "2025-10-05"
            }),
        )
        .await;
        post_transaction(
            server,
            json!({
                "title": "Groceries",
                "amount": 300.0,
                "type": "expense",
                "payment_method": "cash",
                "income_source": "wallet",
                "transaction_date": "2025-10-05"
            }),
        )
        .await;

        let response = server
            .post(endpoints::TRANSFERS)
            .json(&json!({
                "from": "wallet",
                "to": "bank",
                "amount": 200.0,
                "transaction_date": "2025-10-05"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn balances_and_summary_match_the_worked_example() {
        let server = get_test_server();
        seed_worked_example(&server).await;

        let balances = server.get(endpoints::BALANCES).await.json::<Value>();
        assert_eq!(balances["wallet"], 500.0);
        assert_eq!(balances["bank"], 200.0);
        assert_eq!(balances["digital_wallet"], 0.0);

        let summary = server.get(endpoints::SUMMARY).await.json::<Value>();
        assert_eq!(summary["income"], 1000.0);
        assert_eq!(summary["expense"], 300.0);
        assert_eq!(summary["balance"], 700.0);
    }

    #[tokio::test]
    async fn transaction_list_is_newest_first_and_filterable() {
        let server = get_test_server();
        seed_worked_example(&server).await;

        let all = server.get(endpoints::TRANSACTIONS).await.json::<Value>();
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["title"], "Transfer: Wallet → Bank");

        let transfers = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("types", "Transfer")
            .await
            .json::<Value>();
        assert_eq!(transfers.as_array().unwrap().len(), 1);

        let expenses = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("types", "Expense")
            .await
            .json::<Value>();
        let expenses = expenses.as_array().unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0]["title"], "Groceries");
    }

    #[tokio::test]
    async fn grouped_transactions_bucket_by_date() {
        let server = get_test_server();
        post_transaction(
            &server,
            json!({
                "title": "Coffee",
                "amount": 5.0,
                "type": "expense",
                "transaction_date": "2025-10-05"
            }),
        )
        .await;
        post_transaction(
            &server,
            json!({
                "title": "Rent",
                "amount": 800.0,
                "type": "expense",
                "transaction_date": "2025-10-04"
            }),
        )
        .await;

        let groups = server
            .get(endpoints::GROUPED_TRANSACTIONS)
            .await
            .json::<Value>();
        let groups = groups.as_array().unwrap();

        assert_eq!(groups.len(), 2);
        // Buckets follow the newest-first list, so the most recently
        // created row's date comes first.
        assert_eq!(groups[0]["date"], "2025-10-04");
        assert_eq!(groups[1]["date"], "2025-10-05");
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let server = get_test_server();
        let created = post_transaction(
            &server,
            json!({
                "title": "Tea",
                "amount": 5.0,
                "type": "expense",
                "transaction_date": "2025-10-04"
            }),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, id))
            .json(&json!({
                "title": "Coffee",
                "amount": 7.5,
                "type": "expense",
                "transaction_date": "2025-10-04"
            }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["title"], "Coffee");

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, id))
            .await
            .assert_status_ok();

        let remaining = server.get(endpoints::TRANSACTIONS).await.json::<Value>();
        assert!(remaining.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn goal_progress_matches_the_worked_example() {
        let server = get_test_server();

        let category = server
            .post(endpoints::CATEGORIES)
            .json(&json!({ "name": "Trip", "type": "both" }))
            .await
            .json::<Value>();
        let category_id = category["id"].as_i64().unwrap();

        post_transaction(
            &server,
            json!({
                "title": "Bonus",
                "amount": 600.0,
                "type": "income",
                "category_id": category_id,
                "transaction_date": "2025-10-05"
            }),
        )
        .await;
        post_transaction(
            &server,
            json!({
                "title": "Deposit",
                "amount": 200.0,
                "type": "expense",
                "category_id": category_id,
                "transaction_date": "2025-10-05"
            }),
        )
        .await;

        let response = server
            .post(endpoints::GOALS)
            .json(&json!({
                "title": "Trip",
                "target_amount": 1000.0,
                "linked_category_id": category_id,
                "auto_update": true
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let goals = server.get(endpoints::GOALS).await.json::<Value>();
        let goal = &goals.as_array().unwrap()[0];

        assert_eq!(goal["auto_calculated_amount"], 400.0);
        assert_eq!(goal["progress_percent"], 40.0);
        assert_eq!(goal["remaining_amount"], 600.0);
    }

    #[tokio::test]
    async fn manual_goal_progress_update_round_trip() {
        let server = get_test_server();

        let created = server
            .post(endpoints::GOALS)
            .json(&json!({ "title": "Emergency fund", "target_amount": 1000.0 }))
            .await
            .json::<Value>();
        let id = created["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::GOAL_PROGRESS, id))
            .json(&json!({ "current_amount": 250.0 }))
            .await;
        response.assert_status_ok();

        let view = response.json::<Value>();
        assert_eq!(view["current_amount"], 250.0);
        assert_eq!(view["progress_percent"], 25.0);
        assert_eq!(view["remaining_amount"], 750.0);
    }

    #[tokio::test]
    async fn writes_are_published_on_the_events_feed() {
        let server = get_test_server();
        seed_worked_example(&server).await;

        let page = server.get(endpoints::EVENTS).await.json::<Value>();
        let events = page["events"].as_array().unwrap();

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|event| event["table"] == "transaction"));
        assert_eq!(page["cursor"], 3);

        // Polling from the cursor returns nothing new.
        let empty = server
            .get(endpoints::EVENTS)
            .add_query_param("after", 3)
            .await
            .json::<Value>();
        assert!(empty["events"].as_array().unwrap().is_empty());
        assert_eq!(empty["cursor"], 3);
    }

    #[tokio::test]
    async fn unknown_routes_return_a_json_error() {
        let server = get_test_server();

        let response = server.get("/api/nonsense").await;

        response.assert_status_not_found();
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn future_dated_transaction_is_rejected() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "title": "Time travel",
                "amount": 1.0,
                "type": "income",
                "transaction_date": "2999-01-01"
            }))
            .await;

        response.assert_status_bad_request();
    }
}
