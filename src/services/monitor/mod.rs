pub mod live;
pub mod risk;

use super::ServiceContext;
use crate::config::{MonitorPolicy, RiskPolicy};
use crate::errors::{ExamError, Result};
use crate::models::actors::Actor;
use crate::services::access::{ensure_can_manage, load_exam};
use crate::models::monitor::{
    requests::RiskSignals,
    responses::{ActiveSessionItem, LiveExamSnapshot, RiskAssessment},
};

/// 监考看板（只读，无副作用）
pub struct MonitorService {
    pub(crate) ctx: ServiceContext,
    pub(crate) monitor: MonitorPolicy,
    pub(crate) risk: RiskPolicy,
}

impl MonitorService {
    pub fn new(ctx: ServiceContext, monitor: MonitorPolicy, risk: RiskPolicy) -> Self {
        Self { ctx, monitor, risk }
    }

    /// 考试实时快照
    pub async fn snapshot(&self, exam_id: i64, actor: &Actor) -> Result<LiveExamSnapshot> {
        live::snapshot(self, exam_id, actor).await
    }

    /// 教师可见的全部进行中答卷
    pub async fn active_sessions(&self, actor: &Actor) -> Result<Vec<ActiveSessionItem>> {
        live::active_sessions(self, actor).await
    }

    /// 风险评估
    pub fn assess_risk(&self, actor: &Actor, signals: &RiskSignals) -> Result<RiskAssessment> {
        if !actor.role.is_staff() {
            return Err(ExamError::forbidden(
                "Only teaching staff can assess proctoring risk",
            ));
        }
        Ok(risk::assess_risk(signals, &self.risk))
    }

    /// 订阅考试事件流前的权限校验
    pub async fn authorize_exam_stream(&self, exam_id: i64, actor: &Actor) -> Result<()> {
        let exam = load_exam(self.ctx.catalog.as_ref(), exam_id).await?;
        ensure_can_manage(&exam, actor)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::models::answers::requests::SaveAnswerRequest;
    use crate::models::monitor::responses::LiveAlertKind;
    use crate::test_support::{Harness, fixtures};

    fn seed_exam(h: &Harness, exam_id: i64) {
        h.storage.insert_question(fixtures::single_choice(11, "B"));
        h.storage.insert_question(fixtures::single_choice(12, "C"));
        h.storage.insert_exam(fixtures::exam(
            exam_id,
            vec![fixtures::qref(11, 1, 50), fixtures::qref(12, 2, 50)],
        ));
    }

    #[tokio::test]
    async fn test_snapshot_reflects_progress_and_inactivity() {
        let h = Harness::new();
        seed_exam(&h, 1);
        let busy = h.sessions.start_exam(1, 7).await.unwrap();
        let idle = h.sessions.start_exam(1, 8).await.unwrap();

        h.clock.advance(Duration::minutes(12));
        h.sessions
            .save_answer(
                busy.submission_id,
                7,
                SaveAnswerRequest {
                    question_id: 11,
                    answer: Some(json!("B")),
                    answer_text: None,
                    uploaded_file_url: None,
                    uploaded_file_name: None,
                    is_auto_save: true,
                },
            )
            .await
            .unwrap();

        let snapshot = h.monitor.snapshot(1, &Actor::teacher(100)).await.unwrap();
        assert_eq!(snapshot.stats.active_count, 2);
        assert_eq!(snapshot.stats.inactive_count, 1);
        let idle_view = snapshot
            .sessions
            .iter()
            .find(|s| s.submission_id == idle.submission_id)
            .unwrap();
        assert!(idle_view.inactive);
        assert_eq!(idle_view.remaining_minutes, 48);
        let busy_view = snapshot
            .sessions
            .iter()
            .find(|s| s.submission_id == busy.submission_id)
            .unwrap();
        assert_eq!(busy_view.answered_questions, 1);
        assert!(!busy_view.inactive);
        assert!(
            snapshot
                .alerts
                .iter()
                .any(|a| a.kind == LiveAlertKind::Inactive
                    && a.submission_ids == vec![idle.submission_id])
        );

        let forbidden = h.monitor.snapshot(1, &Actor::teacher(555)).await;
        assert!(matches!(forbidden, Err(ExamError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_active_sessions_newest_first() {
        let h = Harness::new();
        seed_exam(&h, 1);
        let first = h.sessions.start_exam(1, 7).await.unwrap();
        h.clock.advance(Duration::minutes(5));
        let second = h.sessions.start_exam(1, 8).await.unwrap();
        h.sessions.submit_exam(first.submission_id, 7).await.unwrap();
        let third = h.sessions.start_exam(1, 9).await.unwrap();

        let items = h.monitor.active_sessions(&Actor::teacher(100)).await.unwrap();
        let ids: Vec<i64> = items.iter().map(|i| i.submission_id).collect();
        assert_eq!(ids, vec![third.submission_id, second.submission_id]);
        assert_eq!(items[1].remaining_seconds, 60 * 60);

        let student = h.monitor.active_sessions(&Actor::student(7)).await;
        assert!(matches!(student, Err(ExamError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_exam_stream_requires_manager() {
        let h = Harness::new();
        seed_exam(&h, 1);
        assert!(h.monitor.authorize_exam_stream(1, &Actor::teacher(101)).await.is_ok());
        assert!(matches!(
            h.monitor.authorize_exam_stream(1, &Actor::student(7)).await,
            Err(ExamError::Forbidden(_))
        ));
        assert!(matches!(
            h.monitor.authorize_exam_stream(99, &Actor::teacher(100)).await,
            Err(ExamError::NotFound(_))
        ));
    }

    #[test]
    fn test_risk_assessment_requires_staff() {
        let h = Harness::new();
        let signals = RiskSignals {
            window_switches: 25,
            ..RiskSignals::default()
        };
        assert!(matches!(
            h.monitor.assess_risk(&Actor::student(7), &signals),
            Err(ExamError::Forbidden(_))
        ));
        let assessment = h.monitor.assess_risk(&Actor::teacher(100), &signals).unwrap();
        assert_eq!(
            assessment.level,
            crate::models::monitor::responses::RiskLevel::Critical
        );
    }
}
