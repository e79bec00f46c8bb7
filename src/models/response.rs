use serde::{Deserialize, Serialize};

use super::notification::{IssueId, NotificationId};

/// 未读数量接口响应
#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// 标记已读请求体
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub ids: Vec<NotificationId>,
}

/// 记录浏览请求体
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordViewRequest {
    pub issue: IssueId,
}

/// 刷新令牌请求体
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// 刷新令牌响应
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// 列表接口响应
///
/// 通常是裸数组；开启分页时 DRF 会包一层 `results`。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListPayload<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Plain(items) => items,
            ListPayload::Paged { results } => results,
        }
    }
}
