use crate::{
    config::Config,
    error::Result,
    services::{
        api::ApiClient,
        auth::{self, CredentialProvider, SessionUser},
        history::HistoryStore,
        notification::NotificationStore,
    },
};
use std::sync::Arc;

/// 客户端的共享状态
/// 包含配置、API 客户端以及两份状态缓存
#[derive(Clone)]
pub struct AppState {
    /// 客户端配置
    pub config: Config,

    /// 远程 API 客户端
    pub api: Arc<ApiClient>,

    /// 通知缓存
    pub notifications: Arc<NotificationStore>,

    /// 浏览历史缓存
    pub history: Arc<HistoryStore>,
}

impl AppState {
    pub fn new(config: Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config, credentials.clone())?);

        let notifications = Arc::new(
            NotificationStore::new(api.clone(), credentials)
                .with_poll_interval(config.poll_interval()),
        );
        let history = Arc::new(HistoryStore::new(api.clone()));

        Ok(Self {
            config,
            api,
            notifications,
            history,
        })
    }

    /// 当前登录用户
    pub fn current_user(&self) -> Option<SessionUser> {
        auth::current_user(self.api.credentials().as_ref())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }
}
