use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared::domain::{CompanyId, SectorId, SortField};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::{
    navigation::{HistoryNavigator, COMPANIES_PATH},
    session::{Session, User},
};

#[derive(Clone, Default)]
struct ServerState {
    authorization: Arc<Mutex<Vec<Option<String>>>>,
    filters: Arc<Mutex<Vec<serde_json::Value>>>,
    logins: Arc<Mutex<Vec<LoginQuery>>>,
}

impl ServerState {
    async fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.authorization.lock().await.push(value);
    }
}

async fn filter_companies(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.record_auth(&headers).await;
    state.filters.lock().await.push(body.clone());

    if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer expired") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "token expired" })));
    }
    match body["name"].as_str() {
        Some("reject") => (
            StatusCode::OK,
            Json(
                serde_json::to_value(ApiEnvelope::<CompanyPage>::rejected("filter rejected"))
                    .expect("envelope"),
            ),
        ),
        Some("boom") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database unavailable" })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "items": [{
                        "id": 4,
                        "name": "Acme",
                        "city": "Izmir",
                        "sectorName": "Software",
                        "averageRating": 4.5,
                        "reviewCount": 12
                    }],
                    "totalCount": 20
                }
            })),
        ),
    }
}

async fn list_sectors(State(state): State<ServerState>, headers: HeaderMap) -> impl IntoResponse {
    state.record_auth(&headers).await;
    Json(ApiEnvelope::ok(vec![
        Sector {
            id: SectorId(1),
            name: "Software".to_string(),
        },
        Sector {
            id: SectorId(2),
            name: "Retail".to_string(),
        },
    ]))
}

async fn login(
    State(state): State<ServerState>,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    state.logins.lock().await.push(query.clone());
    if query.password == "secret" {
        (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "token": "a.b.c" } })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid credentials" })),
        )
    }
}

async fn logout() -> StatusCode {
    StatusCode::OK
}

async fn spawn_api_server() -> anyhow::Result<(ClientSettings, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/Company/filter", post(filter_companies))
        .route("/api/Sector", get(list_sectors))
        .route("/api/Auth/login", post(login))
        .route("/api/Auth/logout", post(logout))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let settings = ClientSettings {
        api_base_url: format!("http://{addr}/api/"),
        ..ClientSettings::default()
    };
    Ok((settings, state))
}

fn filter_request(name: Option<&str>) -> CompanyFilterRequest {
    CompanyFilterRequest {
        name: name.map(str::to_string),
        sector_id: None,
        min_average_rating: 0.0,
        max_average_rating: 5.0,
        sort_by: SortField::Name,
        sort_desc: false,
        page: 1,
        page_size: 9,
    }
}

fn signed_in(token: &str) -> Arc<SessionStore> {
    Arc::new(SessionStore::with_session(Session {
        user: User {
            email: "ada@example.com".to_string(),
            name: None,
        },
        token: token.to_string(),
    }))
}

#[test]
fn statuses_are_classified() {
    assert_eq!(classify_status(StatusCode::OK), ResponseClass::Success);
    assert_eq!(classify_status(StatusCode::NO_CONTENT), ResponseClass::Success);
    assert_eq!(
        classify_status(StatusCode::UNAUTHORIZED),
        ResponseClass::Unauthorized
    );
    assert_eq!(
        classify_status(StatusCode::FORBIDDEN),
        ResponseClass::ClientError(403)
    );
    assert_eq!(
        classify_status(StatusCode::BAD_GATEWAY),
        ResponseClass::ServerError(502)
    );
}

#[tokio::test]
async fn filter_posts_request_and_parses_page() {
    let (settings, state) = spawn_api_server().await.expect("spawn server");
    let client = ApiClient::new(&settings).expect("client");
    assert!(!client.base_url().ends_with('/'));

    let page = client
        .filter_companies(filter_request(Some("Acme")))
        .await
        .expect("filter");

    assert_eq!(page.total_count, 20);
    assert_eq!(page.items[0].id, CompanyId(4));
    assert_eq!(page.items[0].sector_name, "Software");
    let sent = state.filters.lock().await.pop().expect("body");
    assert_eq!(sent["name"], "Acme");
    assert_eq!(sent["pageSize"], 9);
    assert!(sent.get("sectorId").is_none());
}

#[tokio::test]
async fn sectors_are_fetched() {
    let (settings, _state) = spawn_api_server().await.expect("spawn server");
    let client = ApiClient::new(&settings).expect("client");

    let sectors = client.fetch_sectors().await.expect("sectors");

    assert_eq!(
        sectors,
        vec![
            Sector {
                id: SectorId(1),
                name: "Software".to_string()
            },
            Sector {
                id: SectorId(2),
                name: "Retail".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn bearer_token_is_attached_only_with_a_session() {
    let (settings, state) = spawn_api_server().await.expect("spawn server");
    let history: Arc<dyn Navigator> = Arc::new(HistoryNavigator::new(COMPANIES_PATH, None));

    let anonymous = ApiClient::with_session(&settings, Arc::new(SessionStore::new()), history.clone())
        .expect("client");
    anonymous.fetch_sectors().await.expect("sectors");

    let session = signed_in("tok-42");
    let authed = ApiClient::with_session(&settings, session.clone(), history).expect("client");
    authed.fetch_sectors().await.expect("sectors");

    session.logout();
    authed.fetch_sectors().await.expect("sectors");

    assert_eq!(
        *state.authorization.lock().await,
        vec![None, Some("Bearer tok-42".to_string()), None]
    );
}

#[tokio::test]
async fn unauthorized_response_ends_session_and_opens_login() {
    let (settings, _state) = spawn_api_server().await.expect("spawn server");
    let session = signed_in("expired");
    let history = Arc::new(HistoryNavigator::new(COMPANIES_PATH, Some("page=2".to_string())));
    let client = ApiClient::with_session(&settings, session.clone(), history.clone()).expect("client");

    let err = client
        .filter_companies(filter_request(None))
        .await
        .expect_err("must fail");

    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("token expired"));
    assert!(!session.is_authenticated());
    assert_eq!(history.current_path(), LOGIN_PATH);
    assert_eq!(history.entries().len(), 2);
}

#[tokio::test]
async fn unauthorized_on_login_view_leaves_history_alone() {
    let (settings, state) = spawn_api_server().await.expect("spawn server");
    let session = Arc::new(SessionStore::new());
    let history = Arc::new(HistoryNavigator::new(LOGIN_PATH, None));
    let client = ApiClient::with_session(&settings, session, history.clone()).expect("client");

    let err = client
        .login(&LoginQuery {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("must fail");

    assert_eq!(err.server_message(), Some("invalid credentials"));
    assert_eq!(history.entries().len(), 1);
    assert_eq!(
        state.logins.lock().await[0].email,
        "ada@example.com",
        "credentials travel as query parameters"
    );
}

#[tokio::test]
async fn login_returns_token_from_envelope() {
    let (settings, _state) = spawn_api_server().await.expect("spawn server");
    let client = ApiClient::new(&settings).expect("client");

    let data = client
        .login(&LoginQuery {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .expect("login");

    assert_eq!(data.token, "a.b.c");
}

#[tokio::test]
async fn envelope_rejection_carries_server_message() {
    let (settings, _state) = spawn_api_server().await.expect("spawn server");
    let client = ApiClient::new(&settings).expect("client");

    let err = client
        .filter_companies(filter_request(Some("reject")))
        .await
        .expect_err("must fail");

    assert!(matches!(err, ClientError::Rejected { .. }));
    assert_eq!(err.server_message(), Some("filter rejected"));
}

#[tokio::test]
async fn server_error_keeps_status_and_message() {
    let (settings, _state) = spawn_api_server().await.expect("spawn server");
    let client = ApiClient::new(&settings).expect("client");

    let err = client
        .filter_companies(filter_request(Some("boom")))
        .await
        .expect_err("must fail");

    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("database unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_logout_body_counts_as_success() {
    let (settings, _state) = spawn_api_server().await.expect("spawn server");
    let client = ApiClient::new(&settings).expect("client");
    client.logout().await.expect("logout");
}
