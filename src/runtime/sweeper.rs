//! 过期答卷清扫
//!
//! 学生断线后不会再调用保存或交卷，清扫任务按固定间隔把超时的进行中答卷强制提交。

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::services::ExamSessionService;

/// 启动后台清扫任务；间隔为 0 时不启动
pub fn spawn_expiry_sweeper(
    sessions: Arc<ExamSessionService>,
    interval_seconds: u64,
) -> Option<JoinHandle<()>> {
    if interval_seconds == 0 {
        info!("Expired submission sweeper disabled");
        return None;
    }

    info!(
        "Expired submission sweeper running every {} seconds",
        interval_seconds
    );
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            ticker.tick().await;
            run_once(&sessions).await;
        }
    }))
}

async fn run_once(sessions: &ExamSessionService) {
    match sessions.sweep_expired_submissions().await {
        Ok(0) => debug!("Sweeper found no expired submissions"),
        Ok(count) => info!("Sweeper force-submitted {} expired submission(s)", count),
        Err(e) => error!("Expired submission sweep failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::storage::SubmissionStore;
    use crate::test_support::{Harness, fixtures};

    #[tokio::test]
    async fn test_zero_interval_does_not_spawn() {
        let h = Harness::new();
        let sessions = Arc::new(h.sessions);
        assert!(spawn_expiry_sweeper(sessions, 0).is_none());
    }

    #[tokio::test]
    async fn test_run_once_submits_expired() {
        let h = Harness::new();
        h.storage.insert_question(fixtures::single_choice(11, "B"));
        h.storage
            .insert_exam(fixtures::exam(1, vec![fixtures::qref(11, 1, 100)]));
        let session = h.sessions.start_exam(1, 7).await.unwrap();
        h.clock.advance(chrono::Duration::minutes(61));

        run_once(&h.sessions).await;

        let stored = h
            .storage
            .get_submission_by_id(session.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubmissionStatus::Submitted);
        assert!(stored.auto_submitted);
    }
}
