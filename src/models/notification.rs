use serde::{Deserialize, Serialize};

pub type NotificationId = i64;
pub type IssueId = i64;

/// 发送者为系统时服务端返回的名称，展示时不显示
pub const SYSTEM_SENDER: &str = "系统";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[serde(default)]
    pub issue: Option<IssueId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub created: String,
}

impl Notification {
    /// 需要展示的发送者名称，系统通知或缺失时为 `None`
    pub fn display_sender(&self) -> Option<&str> {
        self.sender_name
            .as_deref()
            .filter(|name| !name.is_empty() && *name != SYSTEM_SENDER)
    }

    /// 关联问题的详情页路径
    pub fn detail_path(&self) -> Option<String> {
        self.issue.map(|issue| format!("/detail/{}", issue))
    }
}

/// 通知类型
///
/// 服务端可能新增类型，无法识别的标签保存在 `Other` 中而不是反序列化失败。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    StatusUpdate,
    AdminReply,
    NewComment,
    IssueLiked,
    System,
    Other(String),
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::StatusUpdate => "status_update",
            NotificationType::AdminReply => "admin_reply",
            NotificationType::NewComment => "new_comment",
            NotificationType::IssueLiked => "issue_liked",
            NotificationType::System => "system",
            NotificationType::Other(tag) => tag,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::StatusUpdate => "📋",
            NotificationType::AdminReply => "💬",
            NotificationType::NewComment => "💭",
            NotificationType::IssueLiked => "👍",
            NotificationType::System => "🔔",
            NotificationType::Other(_) => "📢",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationType::StatusUpdate => "状态更新",
            NotificationType::AdminReply => "管理员回复",
            NotificationType::NewComment => "新评论",
            NotificationType::IssueLiked => "问题点赞",
            NotificationType::System => "系统通知",
            NotificationType::Other(_) => "通知",
        }
    }
}

impl From<String> for NotificationType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "status_update" => NotificationType::StatusUpdate,
            "admin_reply" => NotificationType::AdminReply,
            "new_comment" => NotificationType::NewComment,
            "issue_liked" => NotificationType::IssueLiked,
            "system" => NotificationType::System,
            _ => NotificationType::Other(tag),
        }
    }
}

impl From<NotificationType> for String {
    fn from(kind: NotificationType) -> Self {
        match kind {
            NotificationType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// 通知列表筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl ReadFilter {
    /// 转换为列表接口的 `is_read` 查询参数
    pub fn is_read(self) -> Option<bool> {
        match self {
            ReadFilter::All => None,
            ReadFilter::Unread => Some(false),
            ReadFilter::Read => Some(true),
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ReadFilter::All => "暂无通知",
            ReadFilter::Unread => "您没有未读通知",
            ReadFilter::Read => "您没有已读通知",
        }
    }
}
