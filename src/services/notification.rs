use crate::{
    error::SyncError,
    models::{Notification, NotificationId, ReadFilter},
    services::{
        api::NotificationApi,
        auth::CredentialProvider,
        polling::{spawn_periodic, PollingHandle},
        Loadable, LoadingGuard,
    },
};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

const FETCH_UNREAD_COUNT_FAILED: &str = "获取未读通知数量失败";
const FETCH_NOTIFICATIONS_FAILED: &str = "获取通知列表失败";
const MARK_READ_FAILED: &str = "标记通知已读失败";
const MARK_ALL_READ_FAILED: &str = "标记所有通知已读失败";

/// 默认的未读数量刷新间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// 通知缓存的可观察快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub loading: bool,
    pub error: Option<SyncError>,
}

impl NotificationState {
    /// 当前列表中是否还有未读通知
    pub fn has_unread(&self) -> bool {
        self.notifications.iter().any(|n| !n.is_read)
    }
}

impl Loadable for NotificationState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// 通知状态缓存
///
/// 本地只是服务端数据的镜像：列表整体替换，未读数量以服务端返回为准。
/// 所有失败都记录到 `error` 字段，不会向调用方返回错误。
pub struct NotificationStore {
    api: Arc<dyn NotificationApi>,
    credentials: Arc<dyn CredentialProvider>,
    poll_interval: Duration,
    state: watch::Sender<NotificationState>,
}

impl NotificationStore {
    pub fn new(api: Arc<dyn NotificationApi>, credentials: Arc<dyn CredentialProvider>) -> Self {
        let (state, _) = watch::channel(NotificationState::default());
        Self {
            api,
            credentials,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    pub fn unread_count(&self) -> u64 {
        self.state.borrow().unread_count
    }

    fn fail(&self, message: &str) {
        self.state
            .send_modify(|state| state.error = Some(SyncError::failure(message)));
    }

    /// 从服务端同步未读数量
    pub async fn fetch_unread_count(&self) {
        match self.api.unread_count().await {
            Ok(count) => {
                debug!("Unread notification count: {}", count);
                self.state.send_modify(|state| state.unread_count = count);
            }
            Err(e) => {
                error!("Failed to fetch unread notification count: {}", e);
                self.fail(FETCH_UNREAD_COUNT_FAILED);
            }
        }
    }

    /// 获取通知列表，`is_read` 为 `None` 时不筛选
    pub async fn fetch_notifications(&self, is_read: Option<bool>) {
        self.state.send_modify(|state| state.error = None);
        let _loading = LoadingGuard::acquire(&self.state);

        match self.api.list_notifications(is_read).await {
            Ok(notifications) => {
                debug!("Fetched {} notifications (is_read={:?})", notifications.len(), is_read);
                self.state
                    .send_modify(|state| state.notifications = notifications);
            }
            Err(e) => {
                error!("Failed to fetch notifications: {}", e);
                self.fail(FETCH_NOTIFICATIONS_FAILED);
            }
        }
    }

    pub async fn refresh_notifications(&self, filter: ReadFilter) {
        self.fetch_notifications(filter.is_read()).await
    }

    /// 标记指定通知为已读，成功后重新同步未读数量
    pub async fn mark_as_read(&self, ids: &[NotificationId]) {
        if ids.is_empty() {
            debug!("mark_as_read called with no ids, skipping");
            return;
        }

        if let Err(e) = self.api.mark_read(ids.to_vec()).await {
            error!("Failed to mark notifications {:?} as read: {}", ids, e);
            self.fail(MARK_READ_FAILED);
            return;
        }

        let targets: HashSet<NotificationId> = ids.iter().copied().collect();
        self.state.send_modify(|state| {
            for notification in state.notifications.iter_mut() {
                if targets.contains(&notification.id) {
                    notification.is_read = true;
                }
            }
        });

        // 必须在标记完成之后再取数量，才能读到标记后的服务端状态
        self.fetch_unread_count().await;
    }

    /// 标记全部通知为已读
    pub async fn mark_all_as_read(&self) {
        if let Err(e) = self.api.mark_all_read().await {
            error!("Failed to mark all notifications as read: {}", e);
            self.fail(MARK_ALL_READ_FAILED);
            return;
        }

        info!("All notifications marked as read");
        self.state.send_modify(|state| {
            for notification in state.notifications.iter_mut() {
                notification.is_read = true;
            }
            state.unread_count = 0;
        });
    }

    /// 启动未读数量轮询
    ///
    /// 没有登录凭证时返回 `None`。轮询立即执行一次，之后按固定间隔执行，
    /// 直到返回的句柄被丢弃或缓存本身被释放。
    pub fn start_polling(self: &Arc<Self>) -> Option<PollingHandle> {
        if !self.credentials.has_credentials() {
            debug!("No credentials present, unread count polling not started");
            return None;
        }

        let store: Weak<Self> = Arc::downgrade(self);
        Some(spawn_periodic("unread-count", self.poll_interval, move || {
            let store = store.clone();
            async move {
                match store.upgrade() {
                    Some(store) => {
                        store.fetch_unread_count().await;
                        ControlFlow::Continue(())
                    }
                    None => ControlFlow::Break(()),
                }
            }
        }))
    }
}
