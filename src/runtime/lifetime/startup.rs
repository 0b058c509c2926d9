use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::CachedCatalog;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::websocket::WebSocketPublisher;
use crate::services::{ExamSessionService, GradingService, MonitorService, ServiceContext};
use crate::storage::{ExamCatalog, Storage};
use crate::utils::{KeyedLock, SystemClock, ThreadRandom};

pub struct StartupContext {
    pub sessions: Arc<ExamSessionService>,
    pub grading: Arc<GradingService>,
    pub monitor: Arc<MonitorService>,
}

/// 组装服务共享的协作者
fn build_service_context(storage: Arc<dyn Storage>) -> ServiceContext {
    let inner: Arc<dyn ExamCatalog> = storage.clone();
    let catalog = CachedCatalog::from_config(inner);
    debug!("Exam catalog cache initialized");

    ServiceContext {
        storage,
        catalog: Arc::new(catalog),
        clock: Arc::new(SystemClock),
        random: Arc::new(ThreadRandom),
        events: Arc::new(WebSocketPublisher::new()),
        locks: Arc::new(KeyedLock::new()),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、目录缓存与各业务服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let ctx = build_service_context(storage);
    let sessions = Arc::new(ExamSessionService::new(ctx.clone(), config.exam.clone()));
    let grading = Arc::new(GradingService::new(ctx.clone(), &config.exam));
    let monitor = Arc::new(MonitorService::new(
        ctx,
        config.monitor.clone(),
        config.risk.clone(),
    ));

    Ok(StartupContext {
        sessions,
        grading,
        monitor,
    })
}
