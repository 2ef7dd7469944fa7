//! End-to-end tests for the request pipeline against stub backends.
//!
//! Every service is served by one local `mockito` server, so no real backend
//! is needed.

use std::net::TcpListener;
use std::sync::Arc;

use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;

use techfix_admin::auth::{AuthClient, LoginOutcome};
use techfix_admin::config::{Config, UnauthorizedPolicy};
use techfix_admin::error::{AdminError, ApiError};
use techfix_admin::pipeline::{ApiClient, Service, ServiceEndpoint};
use techfix_admin::resources::{Backends, ResourceId};
use techfix_admin::session::{CredentialState, MemoryStore, Session};
use techfix_admin::views::{
    submit_create, submit_update, ComponentForm, DetailState, DetailView, ListView, LoadState,
    OrderForm, RecordForm,
};

/// Config with every service pointed at `base`.
fn test_config(base: &str, policy: UnauthorizedPolicy) -> Config {
    let api = format!("{}/api/", base);
    Config {
        auth_service_url: api.clone(),
        inventory_service_url: api.clone(),
        quotation_service_url: api.clone(),
        order_service_url: api,
        unauthorized_policy: policy,
        ..Config::default()
    }
}

fn clients(config: &Config, session: Session) -> (AuthClient, Backends) {
    let api = ApiClient::new(config, session).unwrap();
    let endpoint = ServiceEndpoint::parse(Service::Auth, &config.auth_service_url).unwrap();
    let auth = AuthClient::new(api.clone(), endpoint).unwrap();
    let backends = Backends::new(config, api).unwrap();
    (auth, backends)
}

fn session_with(token: &str) -> Session {
    Session::new(Arc::new(MemoryStore::with_token(token)))
}

#[tokio::test]
async fn login_then_list_carries_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let login = server
        .mock("POST", "/api/Auth/login")
        .match_body(Matcher::Json(json!({"username": "ops", "password": "hunter22"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token": "tok-123"}"#)
        .create_async()
        .await;

    let list = server
        .mock("GET", "/api/Components")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 1, "name": "CPU", "price": 199.99, "availableStock": 4}]"#)
        .create_async()
        .await;

    let (auth, backends) = clients(&config, Session::in_memory());

    let outcome = auth.login("ops", "hunter22").await.unwrap();
    assert_eq!(outcome, LoginOutcome::Authenticated);
    assert_eq!(auth.session().token().as_deref(), Some("tok-123"));

    let view = ListView::load(&backends.components).await;
    let records = view.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "CPU");

    login.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn login_without_token_leaves_session_alone() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let _login = server
        .mock("POST", "/api/Auth/login")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let (auth, _) = clients(&config, Session::in_memory());
    assert_eq!(auth.login("ops", "hunter22").await.unwrap(), LoginOutcome::NoToken);
    assert_eq!(auth.session().state(), CredentialState::Absent);
}

#[tokio::test]
async fn failed_login_keeps_existing_session() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let login = server
        .mock("POST", "/api/Auth/login")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_body(r#"{"message": "Invalid username or password"}"#)
        .create_async()
        .await;

    let (auth, _) = clients(&config, session_with("still-valid"));
    let err = auth.login("ops", "wrong-pass").await.unwrap_err();

    assert!(matches!(
        err,
        AdminError::Api(ApiError::Unauthorized { ref message }) if message == "Invalid username or password"
    ));
    assert_eq!(auth.session().token().as_deref(), Some("still-valid"));

    login.assert_async().await;
}

#[tokio::test]
async fn absent_credential_sends_no_authorization_header() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let orders = server
        .mock("GET", "/api/Orders")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let (_, backends) = clients(&config, Session::in_memory());
    let view = ListView::load(&backends.orders).await;
    assert_eq!(view.records().map(<[_]>::len), Some(0));
    assert!(view.to_string().contains("No orders found"));

    orders.assert_async().await;
}

#[tokio::test]
async fn logout_stops_sending_the_header() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let unauthenticated = server
        .mock("GET", "/api/Quotations")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let (auth, backends) = clients(&config, session_with("tok-123"));
    auth.logout().unwrap();
    backends.quotations.list().await.unwrap();

    unauthenticated.assert_async().await;
}

#[tokio::test]
async fn delete_with_no_content_removes_locally() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    // Fetched exactly once: the delete must not trigger a refetch.
    let list = server
        .mock("GET", "/api/Components")
        .with_status(200)
        .with_body(
            r#"[{"id": 1, "name": "CPU", "price": 199.99, "availableStock": 4},
                {"id": 2, "name": "GPU", "unitPrice": 499, "quantity": 2}]"#,
        )
        .expect(1)
        .create_async()
        .await;

    let delete = server
        .mock("DELETE", "/api/Components/2")
        .match_header("authorization", "Bearer tok-123")
        .with_status(204)
        .create_async()
        .await;

    let (_, backends) = clients(&config, session_with("tok-123"));
    let mut view = ListView::load(&backends.components).await;
    view.delete(&backends.components, &ResourceId::Int(2)).await;

    let ids: Vec<_> = view.records().unwrap().iter().filter_map(|c| c.id.clone()).collect();
    assert_eq!(ids, vec![ResourceId::Int(1)]);
    let notice = view.notice().unwrap();
    assert!(!notice.is_error());
    assert_eq!(notice.text, "Component deleted successfully!");

    list.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn delete_with_unaccepted_status_keeps_record() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let _list = server
        .mock("GET", "/api/Orders")
        .with_status(200)
        .with_body(r#"[{"id": 7, "customerId": "C-1", "totalAmount": 10, "status": "Pending"}]"#)
        .create_async()
        .await;
    let _delete = server
        .mock("DELETE", "/api/Orders/7")
        .with_status(202)
        .create_async()
        .await;

    let (_, backends) = clients(&config, session_with("tok-123"));
    let mut view = ListView::load(&backends.orders).await;
    view.delete(&backends.orders, &ResourceId::Int(7)).await;

    assert_eq!(view.records().unwrap().len(), 1);
    assert!(view.notice().unwrap().is_error());
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let _missing = server
        .mock("GET", "/api/Quotations/99")
        .with_status(404)
        .with_body(r#"{"message": "Quotation not found"}"#)
        .create_async()
        .await;

    let (_, backends) = clients(&config, session_with("tok-123"));
    let view = DetailView::load(&backends.quotations, ResourceId::Int(99)).await;

    assert_eq!(view.state(), &DetailState::NotFound);
    assert_eq!(view.to_string(), "Quotation 99 not found.\n");
}

#[tokio::test]
async fn server_error_message_comes_from_body() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let _failing = server
        .mock("GET", "/api/Components")
        .with_status(500)
        .with_body(r#"{"message": "Database offline"}"#)
        .create_async()
        .await;

    let (_, backends) = clients(&config, session_with("tok-123"));
    let err = backends.components.list().await.unwrap_err();

    assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    assert!(matches!(&err, ApiError::Server { message, .. } if message == "Database offline"));
}

#[tokio::test]
async fn unreachable_service_is_distinct_from_server_error() {
    let config = Config {
        inventory_service_url: "http://127.0.0.1:1/api/".to_string(),
        ..Config::default()
    };
    let api = ApiClient::new(&config, Session::in_memory()).unwrap();
    let backends = Backends::new(&config, api).unwrap();

    let view = ListView::load(&backends.components).await;
    assert!(matches!(view.state(), LoadState::Failed(ApiError::Unreachable { .. })));
    assert!(view.to_string().contains("No response from server"));
}

#[tokio::test]
async fn stalled_service_times_out_as_unreachable() {
    // Connections complete in the accept backlog but nothing ever answers.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let config = Config {
        order_service_url: format!("http://{}/api/", addr),
        http_timeout_ms: 300,
        connect_timeout_ms: 200,
        ..Config::default()
    };
    let api = ApiClient::new(&config, Session::in_memory()).unwrap();
    let backends = Backends::new(&config, api).unwrap();

    let err = backends.orders.list().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Unreachable {
            reason: "request timed out".to_string()
        }
    );

    drop(listener);
}

#[tokio::test]
async fn unauthorized_clears_credential_by_default() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let _expired = server
        .mock("GET", "/api/Orders")
        .with_status(401)
        .create_async()
        .await;

    let session = session_with("expired");
    let (_, backends) = clients(&config, session.clone());
    let err = backends.orders.list().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(session.state(), CredentialState::Absent);
}

#[tokio::test]
async fn unauthorized_keeps_credential_when_configured() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::Keep);

    let _expired = server
        .mock("GET", "/api/Orders")
        .with_status(401)
        .create_async()
        .await;

    let session = session_with("expired");
    let (_, backends) = clients(&config, session.clone());
    let err = backends.orders.list().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(session.token().as_deref(), Some("expired"));
}

#[tokio::test]
async fn create_sends_validated_record() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let create = server
        .mock("POST", "/api/Components")
        .match_header("authorization", "Bearer tok-123")
        .match_body(Matcher::PartialJson(json!({
            "name": "Case Fan",
            "price": 12.5,
            "availableStock": 30
        })))
        .with_status(201)
        .with_body(r#"{"id": 41, "name": "Case Fan", "price": 12.5, "availableStock": 30}"#)
        .create_async()
        .await;

    let (_, backends) = clients(&config, session_with("tok-123"));
    let form = ComponentForm {
        name: "Case Fan".to_string(),
        description: String::new(),
        price: "12.50".to_string(),
        available_stock: "30".to_string(),
    };

    let notice = submit_create(&backends.components, &form).await;
    assert!(!notice.is_error(), "{}", notice);
    assert_eq!(notice.text, "Component added successfully!");

    create.assert_async().await;
}

#[tokio::test]
async fn invalid_form_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let create = server
        .mock("POST", "/api/Components")
        .expect(0)
        .create_async()
        .await;

    let (_, backends) = clients(&config, session_with("tok-123"));
    let form = ComponentForm {
        name: "Case Fan".to_string(),
        price: "twelve".to_string(),
        available_stock: "30".to_string(),
        ..ComponentForm::default()
    };

    let notice = submit_create(&backends.components, &form).await;
    assert!(notice.is_error());
    assert!(notice.text.starts_with("Invalid component"));

    create.assert_async().await;
}

#[tokio::test]
async fn edit_replaces_with_no_content() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);

    let _fetch = server
        .mock("GET", "/api/Orders/7")
        .with_status(200)
        .with_body(
            r#"{"id": 7, "customerId": "C-1", "orderDate": "2026-03-14T09:26:53",
                "totalAmount": 10, "status": "Pending", "shippingNotes": "fragile"}"#,
        )
        .create_async()
        .await;

    let replace = server
        .mock("PUT", "/api/Orders/7")
        .match_body(Matcher::PartialJson(json!({
            "id": 7,
            "status": "Completed",
            "orderDate": "2026-03-14T09:26:53",
            "shippingNotes": "fragile"
        })))
        .with_status(204)
        .create_async()
        .await;

    let (_, backends) = clients(&config, session_with("tok-123"));
    let id = ResourceId::Int(7);
    let base = DetailView::load(&backends.orders, id.clone())
        .await
        .into_record()
        .unwrap();

    let mut form = OrderForm::from_record(&base);
    form.status = "completed".to_string();

    let notice = submit_update(&backends.orders, &id, &base, &form).await;
    assert_eq!(notice.text, "Order updated successfully!");

    replace.assert_async().await;
}

#[tokio::test]
async fn file_backed_credential_survives_reopen() {
    let mut server = mockito::Server::new_async().await;
    let config = test_config(&server.url(), UnauthorizedPolicy::ClearCredential);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let _login = server
        .mock("POST", "/api/Auth/login")
        .with_status(200)
        .with_body(r#"{"token": "persisted"}"#)
        .create_async()
        .await;

    let (auth, _) = clients(&config, Session::file_backed(&path));
    auth.login("ops", "hunter22").await.unwrap();

    let reopened = Session::file_backed(&path);
    assert_eq!(reopened.token().as_deref(), Some("persisted"));

    let (auth, _) = clients(&config, reopened);
    auth.logout().unwrap();
    assert_eq!(Session::file_backed(&path).state(), CredentialState::Absent);
}
