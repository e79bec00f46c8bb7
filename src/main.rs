use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dovelink_client::{
    models::ReadFilter,
    services::auth::{CredentialProvider, TokenStore},
    utils::{format_relative_time, status_display_text},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DoveLink client against {}", config.api_base_url);

    let token_store = match &config.token_store_path {
        Some(path) => TokenStore::open(path)?,
        None => TokenStore::in_memory(),
    };
    let credentials: Arc<dyn CredentialProvider> = Arc::new(token_store);

    let state = AppState::new(config, credentials)?;

    match state.current_user() {
        Some(user) => info!("Signed in as {} ({})", user.username, user.role),
        None => warn!("No valid access token found, requests will be anonymous"),
    }

    // 启动未读数量轮询
    let poller = state.notifications.start_polling();
    if poller.is_none() {
        warn!("Unread count polling disabled: not signed in");
    }

    let mut updates = state.notifications.subscribe();
    let watcher = tokio::spawn(async move {
        let mut last = None;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if last != Some(snapshot.unread_count) {
                info!("未读通知: {}", snapshot.unread_count);
                last = Some(snapshot.unread_count);
            }
            if let Some(err) = &snapshot.error {
                warn!("{}", err);
            }
        }
    });

    state
        .notifications
        .refresh_notifications(ReadFilter::All)
        .await;
    for notification in &state.notifications.snapshot().notifications {
        let sender = notification
            .display_sender()
            .map(|name| format!(" 来自: {}", name))
            .unwrap_or_default();
        info!(
            "{} [{}]{} {} - {} ({}){}",
            notification.notification_type.icon(),
            notification.notification_type.label(),
            if notification.is_read { "" } else { " ●" },
            notification.title,
            notification.message,
            format_relative_time(&notification.created),
            sender,
        );
    }

    state.history.fetch_history().await;
    for entry in &state.history.snapshot().history {
        info!(
            "浏览记录: {} [{}] {}",
            entry.issue_title,
            entry.issue_status.as_deref().map(status_display_text).unwrap_or("-"),
            entry.viewed_ago(),
        );
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down DoveLink client...");

    if let Some(poller) = poller {
        poller.stop().await;
    }
    watcher.abort();

    Ok(())
}
