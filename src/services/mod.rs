pub mod access;
pub mod eligibility;
pub mod events;
pub mod exam_session;
pub mod grading;
pub mod monitor;
pub mod websocket;

use std::sync::Arc;

use crate::storage::{ExamCatalog, Storage};
use crate::utils::{Clock, KeyedLock, RandomSource};

pub use events::{EventPublisher, ExamEvent};
pub use exam_session::ExamSessionService;
pub use grading::GradingService;
pub use monitor::MonitorService;

/// 各服务共享的协作者
#[derive(Clone)]
pub struct ServiceContext {
    pub storage: Arc<dyn Storage>,
    /// 目录读取（通常是带缓存的包装）
    pub catalog: Arc<dyn ExamCatalog>,
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
    pub events: Arc<dyn EventPublisher>,
    /// 会话与阅卷共用，同一答卷上的变更串行
    pub locks: Arc<KeyedLock>,
}
