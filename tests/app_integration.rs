use serde_json::json;
use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_json(
        server: &MockServer,
        http_method: &str,
        url_path: &str,
        status: u16,
        body: serde_json::Value,
    ) {
        Mock::given(method(http_method))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    pub fn write_config(server: &MockServer) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
        user_id: "user-1"
        backend:
          base_url: {}
          timeout_secs: 5
        currency: "USD"
    "#,
            server.uri()
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_full_link_flow_with_mock() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/plaid/create_link_token",
        200,
        json!({"link_token": "link-sandbox-abc"}),
    )
    .await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/plaid/exchange_public_token",
        200,
        json!({"access_token": "access-sandbox-abc", "item_id": "item-1"}),
    )
    .await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/plaid/store_access_token",
        200,
        json!({"status": "success", "message": "Access token stored", "user_id": "user-1"}),
    )
    .await;
    test_utils::mount_json(
        &server,
        "GET",
        "/api/auth/check",
        200,
        json!({"status": "authenticated"}),
    )
    .await;

    let config_file = test_utils::write_config(&server);
    let result = finlink::run_command(
        finlink::AppCommand::Link {
            public_token: Some("public-sandbox-abc".to_string()),
            institution_id: "ins_109508".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Link flow failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_link_flow_fails_when_session_check_rejected() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/plaid/create_link_token",
        200,
        json!({"link_token": "link-sandbox-abc"}),
    )
    .await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/plaid/exchange_public_token",
        200,
        json!({"access_token": "access-sandbox-abc", "item_id": "item-1"}),
    )
    .await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/plaid/store_access_token",
        200,
        json!({"status": "success"}),
    )
    .await;
    test_utils::mount_json(
        &server,
        "GET",
        "/api/auth/check",
        401,
        json!({"detail": "Not authenticated"}),
    )
    .await;

    let config_file = test_utils::write_config(&server);
    let err = finlink::run_command(
        finlink::AppCommand::Link {
            public_token: Some("public-sandbox-abc".to_string()),
            institution_id: "ins_109508".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap_err();
    info!(error = %format!("{err:#}"), "Link failed as expected");
    assert!(format!("{err:#}").contains("Not authenticated"));
}

#[test_log::test(tokio::test)]
async fn test_link_with_empty_public_token_is_cancelled() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/plaid/create_link_token",
        200,
        json!({"link_token": "link-sandbox-abc"}),
    )
    .await;

    let config_file = test_utils::write_config(&server);
    let err = finlink::run_command(
        finlink::AppCommand::Link {
            public_token: Some(String::new()),
            institution_id: String::new(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap_err();

    let client_err = err
        .downcast_ref::<finlink::core::ClientError>()
        .expect("Expected a client error");
    assert!(matches!(client_err, finlink::core::ClientError::Cancelled(_)));
}

#[test_log::test(tokio::test)]
async fn test_empty_transactions_are_not_an_error() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "GET",
        "/api/transactions",
        200,
        json!({"transactions": []}),
    )
    .await;

    let config_file = test_utils::write_config(&server);
    let result = finlink::run_command(
        finlink::AppCommand::Transactions { limit: None },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Transactions failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_dashboard_survives_one_failed_snapshot() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "GET",
        "/api/transactions",
        200,
        json!({"transactions": [
            {"id": "t1", "date": "2024-05-01", "name": "Coffee", "amount": 4.5,
             "category": "Food and Drink", "pending": true}
        ]}),
    )
    .await;
    test_utils::mount_json(
        &server,
        "GET",
        "/api/net-worth",
        500,
        json!({"detail": "Plaid item login required"}),
    )
    .await;

    let config_file = test_utils::write_config(&server);
    let result = finlink::run_command(
        finlink::AppCommand::Dashboard,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Dashboard failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_backtest_error_detail_is_reported() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/trading/backtest",
        500,
        json!({"detail": "No data found for symbol QQQ"}),
    )
    .await;

    let config_file = test_utils::write_config(&server);
    let request = finlink::core::BacktestRequest {
        symbol: "QQQ".to_string(),
        ..Default::default()
    };
    let err = finlink::run_command(
        finlink::AppCommand::Backtest(request),
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap_err();
    assert!(format!("{err:#}").contains("No data found for symbol QQQ"));
}

#[test_log::test(tokio::test)]
async fn test_backtest_with_mock() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "POST",
        "/api/trading/backtest",
        200,
        json!({
            "performance": {"portfolio_value": {"2020-01-02": 100000.0, "2023-12-29": 115250.0}},
            "statistics": {"total_return": 0.1525, "annual_return": 0.0364,
                           "sharpe_ratio": 0.81, "max_drawdown": -0.1},
            "orders": [{"created_at": "2020-01-02T15:00:00+00:00", "side": "buy",
                        "quantity": 150, "price": 324.87}]
        }),
    )
    .await;

    let config_file = test_utils::write_config(&server);
    let result = finlink::run_command(
        finlink::AppCommand::Backtest(Default::default()),
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Backtest failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_profile_upload_with_mock() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_json(
        &server,
        "POST",
        "/upload-dataset",
        200,
        json!({
            "columns": ["points"],
            "sample_data": [{"points": 10}],
            "profile": {
                "overview": {"rows": 1, "columns": 1, "missing_values": 0, "duplicate_rows": 0},
                "columns": {"points": {"type": "int64", "missing": 0, "unique": 1,
                                       "stats": {"mean": 10.0, "min": 10.0, "max": 10.0}}}
            }
        }),
    )
    .await;

    let dataset = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create dataset file");
    fs::write(dataset.path(), "points\n10\n").expect("Failed to write dataset");

    let config_file = test_utils::write_config(&server);
    let result = finlink::run_command(
        finlink::AppCommand::Profile {
            path: dataset.path().to_path_buf(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Profile failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_is_rejected() {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(config_file.path(), "backend:\n  base_url: http://localhost:1\n")
        .expect("Failed to write config file");

    let result = finlink::run_command(
        finlink::AppCommand::Health,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}
