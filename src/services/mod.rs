pub mod api;
pub mod auth;
pub mod history;
pub mod notification;
pub mod polling;

use tokio::sync::watch;

// 重新导出常用类型
pub use api::{ApiClient, HistoryApi, NotificationApi};
pub use auth::{CredentialProvider, SessionUser, StaticCredentials, TokenStore};
pub use history::{HistoryState, HistoryStore};
pub use notification::{NotificationState, NotificationStore};
pub use polling::PollingHandle;

/// 带加载标记的缓存状态
pub trait Loadable {
    fn set_loading(&mut self, loading: bool);
}

/// 请求期间保持 `loading = true`，离开作用域时复位
///
/// 请求成功、失败或 future 被中途丢弃都会复位。
pub(crate) struct LoadingGuard<'a, S: Loadable> {
    state: &'a watch::Sender<S>,
}

impl<'a, S: Loadable> LoadingGuard<'a, S> {
    pub(crate) fn acquire(state: &'a watch::Sender<S>) -> Self {
        state.send_modify(|s| s.set_loading(true));
        Self { state }
    }
}

impl<S: Loadable> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.set_loading(false));
    }
}
