pub mod history;
pub mod notification;
pub mod response;

pub use history::{HistoryId, ViewHistoryEntry};
pub use notification::{IssueId, Notification, NotificationId, NotificationType, ReadFilter};
