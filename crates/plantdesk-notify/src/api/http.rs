//! reqwest-backed notification API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use plantdesk_core::config::ApiConfig;
use plantdesk_core::error::{AppError, ErrorKind};
use plantdesk_core::local::SessionStorage;
use plantdesk_core::result::AppResult;
use plantdesk_core::types::{ListParams, NotificationId};

use super::{Envelope, NotificationApi, NotificationPage, UnreadCountResponse};

/// HTTP client for the backend notification endpoints.
///
/// The bearer token is read from local storage on every request so that a
/// `session login` in another process is picked up without a restart.
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    client: Client,
    base_url: String,
    session: SessionStorage,
}

impl HttpNotificationApi {
    /// Build a client for `config.base_url`.
    pub fn new(config: &ApiConfig, session: SessionStorage) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn list_url(&self, params: &ListParams) -> AppResult<Url> {
        Url::parse_with_params(&self.api_url("notifications"), params.query_pairs()).map_err(
            |e| AppError::with_source(ErrorKind::Configuration, "Invalid API base URL", e),
        )
    }

    fn authorized(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        match self.session.token()? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(AppError::authentication("No session token stored")),
        }
    }

    async fn send(&self, request: RequestBuilder, kind: ErrorKind, action: &str) -> AppResult<Response> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| AppError::with_source(kind, format!("{action} failed: {e}"), e))?;

        let status = response.status();
        debug!(action, status = status.as_u16(), "Notification API response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::authentication(format!("{action}: session rejected"))
                .with_status(status.as_u16()));
        }
        if !status.is_success() {
            return Err(AppError::new(kind, format!("{action} failed: HTTP {status}"))
                .with_status(status.as_u16()));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, action: &str) -> AppResult<T> {
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Fetch, format!("{action}: unexpected response body"), e)
        })?;
        envelope.into_inner()
    }
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn list(&self, params: &ListParams) -> AppResult<NotificationPage> {
        let url = self.list_url(params)?;
        let response = self
            .send(self.client.get(url), ErrorKind::Fetch, "List notifications")
            .await?;
        Self::decode(response, "List notifications").await
    }

    async fn unread_count(&self) -> AppResult<u64> {
        let response = self
            .send(
                self.client.get(self.api_url("notifications/unread-count")),
                ErrorKind::Fetch,
                "Fetch unread count",
            )
            .await?;
        let body: UnreadCountResponse = Self::decode(response, "Fetch unread count").await?;
        Ok(body.unread_count)
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        let path = format!("notifications/{}/read", encode_segment(id.as_str()));
        self.send(
            self.client.patch(self.api_url(&path)),
            ErrorKind::Mutation,
            "Mark notification read",
        )
        .await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        self.send(
            self.client.patch(self.api_url("notifications/mark-all-read")),
            ErrorKind::Mutation,
            "Mark all notifications read",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use plantdesk_core::local::{FileStore, MemoryStore};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn session_with_token() -> SessionStorage {
        let session = SessionStorage::new(Arc::new(MemoryStore::new()));
        session.set_token("tok-123").unwrap();
        session
    }

    fn api(base_url: String, session: SessionStorage) -> HttpNotificationApi {
        let config = ApiConfig {
            base_url,
            ..ApiConfig::default()
        };
        HttpNotificationApi::new(&config, session).unwrap()
    }

    /// Serves one request with a canned response and returns the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });
        (format!("http://{addr}/api/"), handle)
    }

    #[test]
    fn test_list_url_carries_query() {
        let client = api("http://erp.local/api/".into(), session_with_token());
        let url = client
            .list_url(&ListParams::new(2, 50).unread_only(true))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://erp.local/api/notifications?page=2&limit=50&unreadOnly=true"
        );
    }

    #[tokio::test]
    async fn test_unread_count_sends_bearer_and_unwraps() {
        let (base, server) =
            serve_once("200 OK", r#"{"success":true,"data":{"unreadCount":3}}"#).await;
        let client = api(base, session_with_token());

        assert_eq!(client.unread_count().await.unwrap(), 3);
        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /api/notifications/unread-count "));
        assert!(request.contains("authorization: bearer tok-123"));
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication() {
        let (base, _server) = serve_once("401 Unauthorized", r#"{"message":"expired"}"#).await;
        let client = api(base, session_with_token());

        let err = client.mark_all_read().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.status, Some(401));
    }

    #[tokio::test]
    async fn test_server_error_keeps_mutation_kind_and_status() {
        let (base, server) = serve_once("500 Internal Server Error", "{}").await;
        let client = api(base, session_with_token());

        let err = client.mark_read(&NotificationId::new("abc")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Mutation);
        assert_eq!(err.status, Some(500));
        assert!(server.await.unwrap().starts_with("PATCH /api/notifications/abc/read "));
    }

    #[tokio::test]
    async fn test_login_from_another_process_is_used_on_next_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local-storage.json");
        let daemon = SessionStorage::new(Arc::new(FileStore::open(&path).unwrap()));
        daemon.set_token("tok-old").unwrap();

        let (base, server) =
            serve_once("200 OK", r#"{"success":true,"data":{"unreadCount":0}}"#).await;
        let client = api(base, daemon);

        let cli = SessionStorage::new(Arc::new(FileStore::open(&path).unwrap()));
        cli.set_token("tok-new").unwrap();

        client.unread_count().await.unwrap();
        let request = server.await.unwrap().to_lowercase();
        assert!(request.contains("authorization: bearer tok-new"));
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let session = SessionStorage::new(Arc::new(MemoryStore::new()));
        let client = api("http://127.0.0.1:9/api".into(), session);
        let err = client.unread_count().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.status, None);
    }
}
