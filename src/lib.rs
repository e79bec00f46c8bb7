//! DoveLink 客户端的通知与浏览历史同步层。
//!
//! 本地缓存只是服务端数据的镜像：[`NotificationStore`] 维护通知列表与未读数量，
//! [`HistoryStore`] 维护问题浏览记录，二者都通过 [`ApiClient`] 访问后端。

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{ClientError, Result, SyncError};
pub use services::{
    ApiClient, CredentialProvider, HistoryState, HistoryStore, NotificationState,
    NotificationStore, PollingHandle, StaticCredentials, TokenStore,
};
pub use state::AppState;
