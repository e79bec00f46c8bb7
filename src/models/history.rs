use serde::{Deserialize, Serialize};

use super::notification::IssueId;
use crate::utils::{status, time};

pub type HistoryId = i64;

/// 浏览记录，由服务端在记录浏览时生成，字段为问题信息的快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewHistoryEntry {
    pub id: HistoryId,
    pub issue: IssueId,
    pub issue_title: String,
    #[serde(default)]
    pub issue_topic: Option<String>,
    #[serde(default)]
    pub issue_status: Option<String>,
    pub viewed_at: String,
}

impl ViewHistoryEntry {
    pub fn status_text(&self) -> &str {
        self.issue_status
            .as_deref()
            .map(status::status_display_text)
            .unwrap_or_default()
    }

    pub fn status_class(&self) -> &'static str {
        self.issue_status
            .as_deref()
            .map(status::status_display_class)
            .unwrap_or(status::DEFAULT_STATUS_CLASS)
    }

    pub fn viewed_ago(&self) -> String {
        time::format_relative_time(&self.viewed_at)
    }

    pub fn detail_path(&self) -> String {
        format!("/detail/{}", self.issue)
    }
}
