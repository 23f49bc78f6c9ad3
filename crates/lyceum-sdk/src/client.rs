//! HTTP client for the Lyceum CRM API
//!
//! This module provides a type-safe client for the CRM backend. Every request
//! carries the current access token as a `Bearer` credential. When the backend
//! answers 401 the client refreshes the token once, queues concurrent callers
//! behind that single refresh and replays them with the new token.
//!
//! # Authentication
//!
//! - `login` exchanges phone and password for an access/refresh pair
//! - the pair is kept in a [`CredentialStore`] and written through to a
//!   [`SessionStorage`] backend so a restart does not lose the session
//! - refresh runs over a separate, credential-free channel
//! - a failed refresh clears the session and emits [`SessionEvent::Expired`]
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use lyceum_sdk::{ClientBuilder, FileSessionStorage};
//! use std::sync::Arc;
//!
//! # async fn example() -> lyceum_sdk::Result<()> {
//! let client = ClientBuilder::default()
//!     .base_url("http://localhost:3000")
//!     .session_storage(Arc::new(FileSessionStorage::in_default_dir()?))
//!     .on_session_expired(|reason| eprintln!("signed out: {reason}"))
//!     .build()?;
//!
//! if !client.is_authenticated() {
//!     client.login("+998901234567", "Admin@12345").await?;
//! }
//! let balance = client.finance_balance().await?;
//! # Ok(())
//! # }
//! ```

use crate::auth::{
    types::{ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse},
    CredentialStore, HttpRefreshTransport, RefreshCoordinator, RefreshTransport, SessionEvent,
    SessionEvents, SessionStorage, User,
};
use crate::error::{ApiError, ErrorResponse, Result};
use crate::transport::{ApiRequest, ApiResponse, HttpSettings, ReqwestTransport, Transport};
use lyceum_common::defaults::{
    CHANGE_PASSWORD_PATH, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, LOGIN_PATH, REFRESH_PATH,
};
use lyceum_common::{Password, PhoneNumber};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// HTTP client for interacting with the Lyceum API
pub struct LyceumClient {
    base_url: String,
    store: Arc<CredentialStore>,
    coordinator: RefreshCoordinator,
    /// Same transport without credential handling, used for login
    transport: Arc<dyn Transport>,
    events: Arc<SessionEvents>,
}

impl std::fmt::Debug for LyceumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LyceumClient")
            .field("base_url", &self.base_url)
            .field("store", &self.store)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

impl LyceumClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ===== Session =====

    /// Sign in with phone and password
    ///
    /// The login call bypasses the refresh protocol: a 401 here means wrong
    /// credentials and surfaces as [`ApiError::InvalidCredentials`].
    pub async fn login(&self, phone: &str, password: &str) -> Result<User> {
        let body = LoginRequest {
            phone: PhoneNumber::new(phone).map_err(|e| ApiError::InvalidRequest {
                message: e.to_string(),
            })?,
            password: Password::new(password).map_err(|e| ApiError::InvalidRequest {
                message: e.to_string(),
            })?,
        };

        let request = ApiRequest::post(LOGIN_PATH).with_json(&body)?;
        let response = self.transport.send(request).await?;

        if response.is_unauthorized() {
            return Err(ApiError::InvalidCredentials {
                message: ErrorResponse::message_from(response.status, &response.text()),
            });
        }

        let login: LoginResponse = response.error_for_status()?.json()?;
        let user = login.user;
        self.store
            .set(login.access_token, login.refresh_token, Some(user.clone()))?;

        info!(user_id = %user.id, role = %user.role, "Logged in");
        self.events.emit(SessionEvent::LoggedIn {
            user_id: user.id.clone(),
        });
        Ok(user)
    }

    /// Forget the session locally and in storage
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        info!("Logged out");
        self.events.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Change the password of the signed-in user
    ///
    /// On success the cached user no longer requires a password change.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        if current_password.is_empty() {
            return Err(ApiError::InvalidRequest {
                message: "Current password is required".into(),
            });
        }
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: Password::new(new_password).map_err(|e| ApiError::InvalidRequest {
                message: e.to_string(),
            })?,
        };

        let ack: MessageResponse = self.post(CHANGE_PASSWORD_PATH, &body).await?;
        if let Some(message) = ack.message {
            debug!("Password change acknowledged: {}", message);
        }

        self.store
            .update_user(|user| user.must_change_password = Some(false))?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Current access token, if any
    pub fn access_token(&self) -> Option<String> {
        self.store.get()
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Stream of session lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &Arc<SessionEvents> {
        &self.events
    }

    // ===== Authenticated requests =====

    /// Send a request through the refresh protocol and reject non-2xx answers
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.coordinator.execute(request).await?.error_for_status()
    }

    /// Send a request and decode the JSON body
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    /// Generic GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// GET with query parameters; `None` fields are omitted
    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::get(path).with_query(query)?).await
    }

    /// Generic POST request
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).with_json(body)?).await
    }

    /// Generic PUT request
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).with_json(body)?).await
    }

    /// Generic PATCH request
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::patch(path).with_json(body)?).await
    }

    /// PATCH without a body
    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::patch(path)).await
    }

    /// Generic DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::delete(path)).await
    }

    /// DELETE with query parameters
    pub async fn delete_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::delete(path).with_query(query)?).await
    }
}

type ExpiredCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Builder for constructing a LyceumClient with custom configuration
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_max_idle_per_host: Option<usize>,
    refresh_path: Option<String>,
    session_storage: Option<Arc<dyn SessionStorage>>,
    transport: Option<Arc<dyn Transport>>,
    refresh_transport: Option<Arc<dyn RefreshTransport>>,
    expired_callbacks: Vec<ExpiredCallback>,
}

impl ClientBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL for the API
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Start from an existing credential pair
    ///
    /// Takes precedence over a session restored from storage.
    pub fn with_tokens(
        mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        self.access_token = Some(access_token.into());
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Start from an access token only (refresh credential held in a cookie)
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self.refresh_token = None;
        self
    }

    /// Set the request timeout, shared by the refresh call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = Some(max);
        self
    }

    /// Override the refresh endpoint path
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Persist the session through `storage` and restore it on build
    pub fn session_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.session_storage = Some(storage);
        self
    }

    /// Replace the HTTP transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the refresh channel
    pub fn refresh_transport(mut self, refresh: Arc<dyn RefreshTransport>) -> Self {
        self.refresh_transport = Some(refresh);
        self
    }

    /// Callback invoked with the failure reason when the session becomes void
    pub fn on_session_expired<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.expired_callbacks.push(Arc::new(callback));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<LyceumClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&base_url).map_err(|e| ApiError::InvalidRequest {
            message: format!("Invalid base URL '{}': {}", base_url, e),
        })?;

        let refresh_path = self.refresh_path.unwrap_or_else(|| REFRESH_PATH.to_string());
        if !refresh_path.starts_with('/') {
            return Err(ApiError::InvalidRequest {
                message: format!("Refresh path must start with '/': {}", refresh_path),
            });
        }

        let mut settings = HttpSettings::new(
            self.timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        );
        settings.connect_timeout = self.connect_timeout;
        settings.pool_max_idle_per_host = self.pool_max_idle_per_host;

        let store = match self.session_storage {
            Some(storage) => CredentialStore::restore(storage)?,
            None => CredentialStore::in_memory(),
        };
        if let Some(access_token) = self.access_token {
            store.set(access_token, self.refresh_token, store.user())?;
        }
        let store = Arc::new(store);

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&base_url, &settings)?),
        };
        let refresher: Arc<dyn RefreshTransport> = match self.refresh_transport {
            Some(refresher) => refresher,
            None => Arc::new(HttpRefreshTransport::new(
                &base_url,
                &refresh_path,
                &settings,
            )?),
        };

        let events = Arc::new(SessionEvents::new());
        for callback in self.expired_callbacks {
            events.add_listener(move |event| {
                if let SessionEvent::Expired { reason } = event {
                    callback(reason);
                }
            });
        }

        let coordinator = RefreshCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&transport),
            refresher,
            Arc::clone(&events),
            refresh_path,
        );

        debug!(%base_url, "Lyceum client ready");
        Ok(LyceumClient {
            base_url,
            store,
            coordinator,
            transport,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemorySessionStorage, Role};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn login_body() -> serde_json::Value {
        json!({
            "accessToken": "T1",
            "refreshToken": "R1",
            "user": {
                "id": "u-1",
                "firstname": "Aziza",
                "lastname": "Karimova",
                "phone": "+998901234567",
                "role": "ADMIN",
                "mustChangePassword": true,
                "isActive": true
            }
        })
    }

    #[tokio::test]
    async fn test_get_attaches_bearer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rooms"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "r-1", "name": "Room 101", "capacity": 14}
            ])))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .with_tokens("test-token", "refresh-token")
            .build()
            .unwrap();
        let rooms = client.list_rooms().await.unwrap();

        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "Room 101");
    }

    #[tokio::test]
    async fn test_error_handling() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rooms"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statusCode": 400,
                "message": ["name should not be empty"],
                "error": "Bad Request"
            })))
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .with_tokens("test-token", "refresh-token")
            .build()
            .unwrap();
        let result = client
            .create_room(&crate::types::RoomRequest {
                name: String::new(),
                capacity: None,
            })
            .await;

        assert!(matches!(
            result.unwrap_err(),
            ApiError::BadRequest { message } if message == "name should not be empty"
        ));
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"phone": "+998901234567", "password": "Admin@12345"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(login_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let storage = Arc::new(MemorySessionStorage::new());
        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .session_storage(storage.clone())
            .build()
            .unwrap();
        let mut events = client.subscribe();

        let user = client.login(" +998901234567 ", "Admin@12345").await.unwrap();

        assert_eq!(user.role, Role::Admin);
        assert!(client.is_authenticated());
        assert_eq!(client.access_token().as_deref(), Some("T1"));
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn {
                user_id: "u-1".into()
            }
        );

        let persisted = storage.get_item("auth-storage").unwrap().unwrap();
        let persisted: serde_json::Value = serde_json::from_str(&persisted).unwrap();
        assert_eq!(persisted["token"], "T1");
        assert_eq!(persisted["refreshToken"], "R1");
        assert_eq!(persisted["user"]["id"], "u-1");
    }

    #[tokio::test]
    async fn test_login_rejects_bad_input_locally() {
        let client = ClientBuilder::default().build().unwrap();

        assert!(matches!(
            client.login("", "Admin@12345").await,
            Err(ApiError::InvalidRequest { .. })
        ));
        assert!(matches!(
            client.login("+998901234567", "short").await,
            Err(ApiError::InvalidRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password_never_refreshes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statusCode": 401,
                "message": "Invalid phone or password"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        let result = client.login("+998901234567", "Wrong@12345").await;

        assert!(matches!(
            result,
            Err(ApiError::InvalidCredentials { ref message }) if message == "Invalid phone or password"
        ));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_change_password_clears_flag() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(201).set_body_json(login_body()))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/change-password"))
            .and(header("Authorization", "Bearer T1"))
            .and(body_json(json!({
                "currentPassword": "Admin@12345",
                "newPassword": "Better@54321"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"message": "Password updated"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ClientBuilder::default()
            .base_url(mock_server.uri())
            .build()
            .unwrap();
        client.login("+998901234567", "Admin@12345").await.unwrap();
        assert!(client.current_user().unwrap().must_change_password());

        client
            .change_password("Admin@12345", "Better@54321")
            .await
            .unwrap();
        assert!(!client.current_user().unwrap().must_change_password());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let storage = Arc::new(MemorySessionStorage::new());
        let client = ClientBuilder::default()
            .with_tokens("T1", "R1")
            .session_storage(storage.clone())
            .build()
            .unwrap();
        assert!(storage.get_item("auth-storage").unwrap().is_some());

        client.logout().unwrap();

        assert!(!client.is_authenticated());
        assert_eq!(client.access_token(), None);
        assert!(storage.get_item("auth-storage").unwrap().is_none());
    }

    #[test]
    fn test_builder_with_all_options() {
        let client = ClientBuilder::default()
            .base_url("http://crm.example.test/api/")
            .with_tokens("test-token", "refresh-token")
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(100)
            .refresh_path("/auth/refresh")
            .on_session_expired(|_| {})
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://crm.example.test/api");
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_builder_rejects_bad_settings() {
        assert!(matches!(
            ClientBuilder::default().base_url("not a url").build(),
            Err(ApiError::InvalidRequest { .. })
        ));
        assert!(matches!(
            ClientBuilder::default().refresh_path("auth/refresh").build(),
            Err(ApiError::InvalidRequest { .. })
        ));
    }
}
