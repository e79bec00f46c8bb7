use crate::{
    config::Config,
    error::{ClientError, Result},
    models::{
        response::{
            ListPayload, MarkReadRequest, RecordViewRequest, RefreshRequest, RefreshResponse,
            UnreadCountResponse,
        },
        IssueId, Notification, NotificationId, ViewHistoryEntry,
    },
    services::auth::CredentialProvider,
};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// 通知相关的远程接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn unread_count(&self) -> Result<u64>;

    async fn list_notifications(&self, is_read: Option<bool>) -> Result<Vec<Notification>>;

    async fn mark_read(&self, ids: Vec<NotificationId>) -> Result<()>;

    async fn mark_all_read(&self) -> Result<()>;
}

/// 浏览历史相关的远程接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryApi: Send + Sync {
    async fn list_history(&self) -> Result<Vec<ViewHistoryEntry>>;

    async fn record_view(&self, issue: IssueId) -> Result<()>;

    async fn clear_history(&self) -> Result<()>;
}

/// 单次请求的描述，刷新令牌后需要按原样重放
struct ApiRequest<'a> {
    method: Method,
    path: &'a str,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
}

impl<'a> ApiRequest<'a> {
    fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: Url,
    refresh_path: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        // Url::join 需要以 `/` 结尾才会把路径拼在后面
        let mut base = config.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        Ok(Self {
            http_client,
            base_url,
            refresh_path: config.token_refresh_path.trim_start_matches('/').to_string(),
            credentials,
        })
    }

    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        self.credentials.clone()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send_once(&self, request: &ApiRequest<'_>) -> Result<Response> {
        let url = self.base_url.join(request.path)?;
        let mut builder = self.http_client.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.credentials.access_token() {
            builder = builder.bearer_auth(token);
        }

        Ok(builder.send().await?)
    }

    /// 发送请求；访问令牌过期（401）时刷新一次并重放
    async fn send(&self, request: ApiRequest<'_>) -> Result<Response> {
        debug!("{} {}", request.method, request.path);

        let response = self.send_once(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_status(response).await;
        }

        let Some(refresh) = self.credentials.refresh_token() else {
            return Self::check_status(response).await;
        };

        info!("Access token rejected for {}, attempting refresh", request.path);
        match self.refresh_access_token(&refresh).await {
            Ok(()) => {
                let retried = self.send_once(&request).await?;
                Self::check_status(retried).await
            }
            Err(e) => {
                warn!("Token refresh failed, clearing credentials: {}", e);
                self.credentials.clear();
                Err(ClientError::unauthorized("Session expired"))
            }
        }
    }

    async fn refresh_access_token(&self, refresh: &str) -> Result<()> {
        let url = self.base_url.join(&self.refresh_path)?;
        let response = self
            .http_client
            .post(url)
            .json(&RefreshRequest {
                refresh: refresh.to_string(),
            })
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let refreshed: RefreshResponse = response.json().await?;
        self.credentials.set_access_token(Some(&refreshed.access));
        debug!("Access token refreshed");
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        error!("API {} returned {}: {}", url.path(), status, body);
        Err(ClientError::Status { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: ApiRequest<'_>) -> Result<T> {
        let path = request.path;
        let response = self.send(request).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(
                "Unexpected payload from {}: {} ({})",
                path,
                String::from_utf8_lossy(&body),
                e
            );
            ClientError::Serialization(e)
        })
    }

    async fn get_list<T: DeserializeOwned>(&self, request: ApiRequest<'_>) -> Result<Vec<T>> {
        let payload: ListPayload<T> = self.get_json(request).await?;
        Ok(payload.into_items())
    }
}

#[async_trait]
impl NotificationApi for ApiClient {
    async fn unread_count(&self) -> Result<u64> {
        let response: UnreadCountResponse = self
            .get_json(ApiRequest::new(Method::GET, "notifications/unread-count/"))
            .await?;
        Ok(response.unread_count)
    }

    async fn list_notifications(&self, is_read: Option<bool>) -> Result<Vec<Notification>> {
        let mut request = ApiRequest::new(Method::GET, "notifications/");
        if let Some(is_read) = is_read {
            request = request.query("is_read", is_read);
        }
        self.get_list(request).await
    }

    async fn mark_read(&self, ids: Vec<NotificationId>) -> Result<()> {
        let body = serde_json::to_value(MarkReadRequest { ids })?;
        self.send(ApiRequest::new(Method::POST, "notifications/mark-read/").json(body))
            .await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<()> {
        self.send(ApiRequest::new(Method::POST, "notifications/mark-all-read/"))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryApi for ApiClient {
    async fn list_history(&self) -> Result<Vec<ViewHistoryEntry>> {
        self.get_list(ApiRequest::new(Method::GET, "history/")).await
    }

    async fn record_view(&self, issue: IssueId) -> Result<()> {
        let body = serde_json::to_value(RecordViewRequest { issue })?;
        self.send(ApiRequest::new(Method::POST, "history/record/").json(body))
            .await?;
        Ok(())
    }

    async fn clear_history(&self) -> Result<()> {
        self.send(ApiRequest::new(Method::DELETE, "history/clear/"))
            .await?;
        Ok(())
    }
}
