use crate::{
    error::SyncError,
    models::{IssueId, ViewHistoryEntry},
    services::{api::HistoryApi, Loadable, LoadingGuard},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

const FETCH_HISTORY_FAILED: &str = "获取浏览历史失败";
const RECORD_VIEW_FAILED: &str = "记录浏览失败";
const CLEAR_HISTORY_FAILED: &str = "清空历史失败";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryState {
    pub history: Vec<ViewHistoryEntry>,
    pub loading: bool,
    pub error: Option<SyncError>,
}

impl Loadable for HistoryState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// 浏览历史缓存
///
/// 记录由服务端生成，本地从不自行构造条目。
pub struct HistoryStore {
    api: Arc<dyn HistoryApi>,
    state: watch::Sender<HistoryState>,
}

impl HistoryStore {
    pub fn new(api: Arc<dyn HistoryApi>) -> Self {
        let (state, _) = watch::channel(HistoryState::default());
        Self { api, state }
    }

    pub fn snapshot(&self) -> HistoryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HistoryState> {
        self.state.subscribe()
    }

    fn fail(&self, message: &str) {
        self.state
            .send_modify(|state| state.error = Some(SyncError::failure(message)));
    }

    /// 获取浏览历史
    pub async fn fetch_history(&self) {
        self.state.send_modify(|state| state.error = None);
        let _loading = LoadingGuard::acquire(&self.state);

        match self.api.list_history().await {
            Ok(history) => {
                debug!("Fetched {} history entries", history.len());
                self.state.send_modify(|state| state.history = history);
            }
            Err(e) => {
                error!("Failed to fetch view history: {}", e);
                self.fail(FETCH_HISTORY_FAILED);
            }
        }
    }

    /// 记录一次浏览，成功后重新获取完整列表
    pub async fn record_view(&self, issue_id: IssueId) {
        if let Err(e) = self.api.record_view(issue_id).await {
            error!("Failed to record view of issue {}: {}", issue_id, e);
            self.fail(RECORD_VIEW_FAILED);
            return;
        }

        // 快照字段由服务端生成，重新拉取而不是本地追加
        self.fetch_history().await;
    }

    /// 清空浏览历史
    pub async fn clear_history(&self) {
        if let Err(e) = self.api.clear_history().await {
            error!("Failed to clear view history: {}", e);
            self.fail(CLEAR_HISTORY_FAILED);
            return;
        }

        info!("View history cleared");
        self.state.send_modify(|state| state.history.clear());
    }
}
