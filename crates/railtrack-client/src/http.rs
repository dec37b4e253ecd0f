//! # HTTP Inventory API
//!
//! `reqwest` implementation of [`Authenticator`] and [`InventoryApi`].
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  endpoint(segments)   base_url + percent-encoded path segments         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  request()            reads SessionHandle NOW:                         │
//! │                       token?  → Authorization: Bearer <token>          │
//! │                       none    → no Authorization header                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  send()               2xx → Ok(response)                               │
//! │                       401 → Unauthorized                               │
//! │                       404 → NotFound(id)                               │
//! │                       *   → Status { status, message }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Error bodies are JSON objects with a `msg`, `detail`, `message` or `error`
//! field; the first one present becomes the error message.

use async_trait::async_trait;
use railtrack_core::{ComponentReport, CreatedComponent, InventoryRecord, NewComponent};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::api::{Authenticator, InventoryApi};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionHandle;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Serialize)]
struct ReportRequest<'a> {
    component_id: &'a str,
}

/// Inventory API client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpInventoryApi {
    http: Client,
    base_url: Url,
    session: SessionHandle,
}

impl HttpInventoryApi {
    pub fn new(config: &ClientConfig, session: SessionHandle) -> ClientResult<Self> {
        config.validate()?;

        let base_url = Url::parse(config.base_url())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url().to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(HttpInventoryApi {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "Sending request");

        let mut builder = self.http.request(method, url);
        if let Some(token) = self.session.token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        Ok(builder)
    }

    /// Sends and maps non-success statuses. `subject` names the record a 404
    /// refers to.
    async fn send(&self, builder: RequestBuilder, subject: Option<&str>) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), %message, "Request rejected");

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(subject.unwrap_or(&message).to_string()),
            _ => ClientError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["msg", "detail", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string())
}

#[async_trait]
impl Authenticator for HttpInventoryApi {
    async fn authenticate(&self, username: &str, password: &str) -> ClientResult<String> {
        let builder = self
            .request(Method::POST, &["login"])?
            .json(&LoginRequest { username, password });

        let response = match self.send(builder, None).await {
            Ok(response) => response,
            Err(ClientError::Unauthorized) => {
                return Err(ClientError::Auth("invalid username or password".into()))
            }
            Err(e) => return Err(e),
        };

        let body: LoginResponse = response.json().await?;
        Ok(body.access_token)
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryApi {
    async fn fetch_all(&self) -> ClientResult<Vec<InventoryRecord>> {
        let builder = self.request(Method::GET, &["components"])?;
        let records: Vec<InventoryRecord> = self.send(builder, None).await?.json().await?;
        debug!(count = records.len(), "Fetched inventory");
        Ok(records)
    }

    async fn fetch_one(&self, id: &str) -> ClientResult<InventoryRecord> {
        let builder = self.request(Method::GET, &["components", id])?;
        Ok(self.send(builder, Some(id)).await?.json().await?)
    }

    async fn create(&self, component: &NewComponent) -> ClientResult<CreatedComponent> {
        let builder = self
            .request(Method::POST, &["components", "add"])?
            .json(component);
        Ok(self.send(builder, None).await?.json().await?)
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["components", "delete", id])?;
        self.send(builder, Some(id)).await?;
        Ok(())
    }

    async fn generate_report(&self, id: &str) -> ClientResult<ComponentReport> {
        let builder = self
            .request(Method::POST, &["report", "generate"])?
            .json(&ReportRequest { component_id: id });
        Ok(self.send(builder, Some(id)).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::response::{IntoResponse, Response as AxumResponse};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use railtrack_core::{ComponentStatus, Session};
    use serde_json::{json, Value};

    const TOKEN: &str = "tok-123";

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", TOKEN))
            .unwrap_or(false)
    }

    fn reject() -> AxumResponse {
        (
            axum::http::StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "Missing Authorization Header" })),
        )
            .into_response()
    }

    fn not_found() -> AxumResponse {
        (
            axum::http::StatusCode::NOT_FOUND,
            Json(json!({ "message": "Component not found" })),
        )
            .into_response()
    }

    async fn login(Json(body): Json<Value>) -> AxumResponse {
        if body["username"] == "admin" && body["password"] == "secret" {
            Json(json!({ "access_token": TOKEN })).into_response()
        } else {
            (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(json!({ "msg": "Bad username or password" })),
            )
                .into_response()
        }
    }

    async fn list(headers: HeaderMap) -> AxumResponse {
        if !authorized(&headers) {
            return reject();
        }
        Json(json!([
            { "component_id": "K9", "component_type": "Liner", "vendor_name": "Acme",
              "batch_no": "B-1", "status": "Installed", "material": "Nylon 66" },
            { "component_id": "A1", "component_type": "Rail Clip", "vendor_name": null,
              "batch_no": "B-2", "status": "In Storage" }
        ]))
        .into_response()
    }

    async fn one(headers: HeaderMap, Path(id): Path<String>) -> AxumResponse {
        if !authorized(&headers) {
            return reject();
        }
        if id != "K9" {
            return not_found();
        }
        Json(json!({ "component_id": "K9", "component_type": "Liner",
                     "vendor_name": "Acme", "track_section_id": "MUM-SUR-UP-KM254" }))
        .into_response()
    }

    async fn add(headers: HeaderMap, Json(body): Json<Value>) -> AxumResponse {
        if !authorized(&headers) {
            return reject();
        }
        let mut component = body.clone();
        component["component_id"] = json!("Zq81LmNo");
        Json(json!({
            "message": "Component created successfully",
            "component": component,
            "svg_content": "<svg/>",
            "dxf_content": "0\nEOF"
        }))
        .into_response()
    }

    async fn remove(headers: HeaderMap, Path(id): Path<String>) -> AxumResponse {
        if !authorized(&headers) {
            return reject();
        }
        if id != "K9" {
            return not_found();
        }
        Json(json!({ "message": format!("Component {} deleted successfully.", id) }))
            .into_response()
    }

    async fn report(headers: HeaderMap, Json(body): Json<Value>) -> AxumResponse {
        if !authorized(&headers) {
            return reject();
        }
        match body["component_id"].as_str() {
            Some("K9") => Json(json!({ "report_text": "# Railway Component Maintenance Report" }))
                .into_response(),
            _ => not_found(),
        }
    }

    async fn broken() -> AxumResponse {
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "database unavailable",
        )
            .into_response()
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/components", get(list))
            .route("/api/components/add", post(add))
            .route("/api/components/{id}", get(one))
            .route("/api/components/delete/{id}", delete(remove))
            .route("/api/report/generate", post(report))
            .route("/broken/components", get(broken));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        format!("http://{}", addr)
    }

    fn client(root: &str, path: &str, session: SessionHandle) -> HttpInventoryApi {
        let mut config = ClientConfig::default();
        config.api.base_url = format!("{}{}", root, path);
        HttpInventoryApi::new(&config, session).unwrap()
    }

    fn logged_in() -> SessionHandle {
        SessionHandle::new(Session::new(Some(TOKEN.into())))
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let root = spawn_server().await;
        let api = client(&root, "/api", SessionHandle::anonymous());

        assert_eq!(api.authenticate("admin", "secret").await.unwrap(), TOKEN);
        assert!(matches!(
            api.authenticate("admin", "wrong").await,
            Err(ClientError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_bearer_header_follows_session() {
        let root = spawn_server().await;

        let anonymous = client(&root, "/api", SessionHandle::anonymous());
        assert!(matches!(
            anonymous.fetch_all().await,
            Err(ClientError::Unauthorized)
        ));

        let records = client(&root, "/api", logged_in()).fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, ComponentStatus::Installed);
        assert_eq!(records[0].extra_str("material"), Some("Nylon 66"));
        assert_eq!(records[1].vendor, "");

        let stale = SessionHandle::new(Session::new(Some("expired".into())));
        assert!(matches!(
            client(&root, "/api/", stale).fetch_all().await,
            Err(ClientError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_fetch_one_and_not_found() {
        let root = spawn_server().await;
        let api = client(&root, "/api", logged_in());

        let record = api.fetch_one("K9").await.unwrap();
        assert_eq!(record.extra_str("track_section_id"), Some("MUM-SUR-UP-KM254"));

        match api.fetch_one("missing").await {
            Err(ClientError::NotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_delete_and_report() {
        let root = spawn_server().await;
        let api = client(&root, "/api", logged_in());

        let created = api
            .create(&NewComponent {
                component_type: "Liner".into(),
                material: "Nylon 66".into(),
                vendor_name: "Acme".into(),
                batch_no: "B-7".into(),
                manufacturing_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                warranty_years: 10,
                installation_date: None,
                track_section_id: None,
                location_lat: None,
                location_lon: None,
            })
            .await
            .unwrap();
        assert_eq!(created.component_id(), "Zq81LmNo");
        assert_eq!(created.component.vendor, "Acme");
        assert_eq!(created.label_files()[1].file_name, "qr_Zq81LmNo.dxf");

        api.delete("K9").await.unwrap();
        assert!(matches!(
            api.delete("gone").await,
            Err(ClientError::NotFound(_))
        ));

        let report = api.generate_report("K9").await.unwrap();
        assert!(report.report_text.starts_with("# Railway"));
        assert!(matches!(
            api.generate_report("gone").await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let root = spawn_server().await;
        let api = client(&root, "/broken", logged_in());

        match api.fetch_all().await {
            Err(err @ ClientError::Status { status: 500, .. }) => assert!(err.is_retryable()),
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = client(&format!("http://{}", addr), "/api", logged_in());
        let err = api.fetch_all().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("http://localhost:8000", "/api/", SessionHandle::anonymous());
        let url = api.endpoint(&["components", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/components/a%20b%2Fc");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, r#"{"msg":"Token has expired"}"#),
            "Token has expired"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"detail":"Missing 'component_id'"}"#),
            "Missing 'component_id'"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, "<html>"), "Not Found");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://localhost/api".into();
        assert!(HttpInventoryApi::new(&config, SessionHandle::anonymous()).is_err());
    }
}
