pub mod answer;
pub mod control;
pub mod questions;
pub mod result;
pub mod session;
pub mod start;
pub mod submit;

use rust_decimal::Decimal;

use super::ServiceContext;
use crate::config::SessionPolicy;
use crate::errors::Result;
use crate::models::actors::Actor;
use crate::models::answers::{
    requests::SaveAnswerRequest,
    responses::{QuestionView, SaveAnswerResponse},
};
use crate::models::exams::responses::EligibilityResult;
use crate::models::submissions::{
    requests::{PauseExamRequest, ResumeExamRequest},
    responses::{ExamResultResponse, SessionInfo, StatusChangeResponse, SubmitExamResponse},
};
use crate::services::access::load_owned_submission;
use crate::utils::decimal::from_f64;

/// 答题流程：开考、答题、交卷与教师暂停/恢复
pub struct ExamSessionService {
    pub(crate) ctx: ServiceContext,
    pub(crate) policy: SessionPolicy,
}

impl ExamSessionService {
    pub fn new(ctx: ServiceContext, policy: SessionPolicy) -> Self {
        Self { ctx, policy }
    }

    /// 缺少分值配置时的兜底满分
    pub(crate) fn grading_fallback(&self) -> Decimal {
        from_f64(self.policy.fallback_max_points)
    }

    /// 开考资格
    pub async fn check_eligibility(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<EligibilityResult> {
        start::check_eligibility(self, exam_id, student_id).await
    }

    /// 开始考试
    pub async fn start_exam(&self, exam_id: i64, student_id: i64) -> Result<SessionInfo> {
        start::start_exam(self, exam_id, student_id).await
    }

    /// 续考：获取已有活动答卷的会话信息
    pub async fn get_session(&self, submission_id: i64, student_id: i64) -> Result<SessionInfo> {
        session::get_session(self, submission_id, student_id).await
    }

    /// 获取试题
    pub async fn get_exam_questions(
        &self,
        submission_id: i64,
        student_id: i64,
    ) -> Result<Vec<QuestionView>> {
        questions::get_exam_questions(self, submission_id, student_id).await
    }

    /// 保存作答
    pub async fn save_answer(
        &self,
        submission_id: i64,
        student_id: i64,
        req: SaveAnswerRequest,
    ) -> Result<SaveAnswerResponse> {
        answer::save_answer(self, submission_id, student_id, req).await
    }

    /// 交卷
    pub async fn submit_exam(
        &self,
        submission_id: i64,
        student_id: i64,
    ) -> Result<SubmitExamResponse> {
        submit::submit_exam(self, submission_id, student_id).await
    }

    /// 查看成绩
    pub async fn get_result(
        &self,
        submission_id: i64,
        student_id: i64,
    ) -> Result<ExamResultResponse> {
        result::get_result(self, submission_id, student_id).await
    }

    /// 暂停考试
    pub async fn pause_exam(
        &self,
        submission_id: i64,
        actor: &Actor,
        req: PauseExamRequest,
    ) -> Result<StatusChangeResponse> {
        control::pause_exam(self, submission_id, actor, req).await
    }

    /// 恢复考试
    pub async fn resume_exam(
        &self,
        submission_id: i64,
        actor: &Actor,
        req: ResumeExamRequest,
    ) -> Result<StatusChangeResponse> {
        control::resume_exam(self, submission_id, actor, req).await
    }

    /// 强制提交所有已超时的进行中答卷，返回处理数量
    pub async fn sweep_expired_submissions(&self) -> Result<usize> {
        submit::sweep_expired_submissions(self).await
    }

    /// 学生只能订阅自己答卷的事件流
    pub async fn authorize_submission_stream(
        &self,
        submission_id: i64,
        student_id: i64,
    ) -> Result<()> {
        load_owned_submission(self.ctx.storage.as_ref(), submission_id, student_id)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use futures_util::future::join_all;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    use crate::errors::ExamError;
    use crate::models::actors::Actor;
    use crate::models::answers::requests::SaveAnswerRequest;
    use crate::models::exams::entities::ExamDefinition;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::models::submissions::requests::{PauseExamRequest, ResumeExamRequest};
    use crate::services::events::ExamEvent;
    use crate::storage::SubmissionStore;
    use crate::test_support::{Harness, fixtures};

    const STUDENT: i64 = 7;
    const TEACHER: i64 = 100;

    /// 两道各 50 分的单选题，标准答案分别为 B 与 C
    fn two_question_exam(h: &Harness) -> ExamDefinition {
        let exam = fixtures::exam(
            1,
            vec![fixtures::qref(11, 1, 50), fixtures::qref(12, 2, 50)],
        );
        h.storage.insert_question(fixtures::single_choice(11, "B"));
        h.storage.insert_question(fixtures::single_choice(12, "C"));
        h.storage.insert_exam(exam.clone());
        exam
    }

    fn save(question_id: i64, answer: serde_json::Value) -> SaveAnswerRequest {
        SaveAnswerRequest {
            question_id,
            answer: Some(answer),
            answer_text: None,
            uploaded_file_url: None,
            uploaded_file_name: None,
            is_auto_save: false,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_single_choice_exam() {
        let h = Harness::new();
        two_question_exam(&h);

        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        assert_eq!(session.attempt_number, 1);
        assert_eq!(session.total_questions, 2);
        assert_eq!(session.remaining_seconds, 3600);
        assert_eq!(session.must_submit_before, fixtures::t0() + Duration::minutes(60));
        assert_eq!(session.auto_save_interval_seconds, 30);

        let right = h
            .sessions
            .save_answer(session.submission_id, STUDENT, save(11, json!("B")))
            .await
            .unwrap();
        assert!(right.is_graded);
        assert_eq!(right.points_earned, Some(Decimal::from(50)));
        assert_eq!(right.message, "Answer saved");

        let wrong = h
            .sessions
            .save_answer(session.submission_id, STUDENT, save(12, json!("A")))
            .await
            .unwrap();
        assert_eq!(wrong.points_earned, Some(Decimal::ZERO));

        h.clock.advance(Duration::minutes(25));
        let result = h
            .sessions
            .submit_exam(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert_eq!(result.status, SubmissionStatus::Submitted);
        assert_eq!(result.total_score, Decimal::from(50));
        assert!(!result.passed);
        assert!(!result.auto_submitted);
        assert_eq!(result.time_spent_seconds, 25 * 60);
        assert_eq!(result.percentage, Some(Decimal::from_str("50.00").unwrap()));
        assert_eq!(result.pending_manual_grading, 0);

        let again = h.sessions.submit_exam(session.submission_id, STUDENT).await;
        assert!(matches!(again, Err(ExamError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_max_attempts_blocks_new_start() {
        let h = Harness::new();
        let mut exam = two_question_exam(&h);
        exam.max_attempts = 2;
        h.storage.insert_exam(exam);

        for attempt in 1..=2 {
            let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
            assert_eq!(session.attempt_number, attempt);
            h.sessions
                .submit_exam(session.submission_id, STUDENT)
                .await
                .unwrap();
        }

        let eligibility = h.sessions.check_eligibility(1, STUDENT).await.unwrap();
        assert!(!eligibility.eligible);
        assert_eq!(eligibility.remaining_attempts, Some(0));

        let err = h.sessions.start_exam(1, STUDENT).await.unwrap_err();
        assert!(matches!(err, ExamError::InvalidState(_)));
        assert!(err.message().contains("Maximum attempts reached"));
    }

    #[tokio::test]
    async fn test_concurrent_starts_yield_one_active_submission() {
        let h = Harness::new();
        two_question_exam(&h);

        let results = join_all((0..8).map(|_| h.sessions.start_exam(1, STUDENT))).await;
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, ExamError::InvalidState(_)))
        );

        let history = h
            .storage
            .list_submissions_by_student_and_exam(STUDENT, 1)
            .await
            .unwrap();
        assert_eq!(history.iter().filter(|s| s.status.is_active()).count(), 1);
    }

    #[tokio::test]
    async fn test_question_order_is_stable_per_seed() {
        let h = Harness::new();
        let refs = (1..=10)
            .map(|id| fixtures::qref(id, id as i32, 10))
            .collect();
        let mut exam = fixtures::exam(1, refs);
        exam.randomize_questions = true;
        h.storage.insert_exam(exam);
        for id in 1..=10 {
            h.storage.insert_question(fixtures::single_choice(id, "A"));
        }

        let first = h.sessions.start_exam(1, STUDENT).await.unwrap();
        let order = |views: Vec<crate::models::answers::responses::QuestionView>| {
            views.into_iter().map(|v| v.question_id).collect::<Vec<_>>()
        };
        let a = order(
            h.sessions
                .get_exam_questions(first.submission_id, STUDENT)
                .await
                .unwrap(),
        );
        let b = order(
            h.sessions
                .get_exam_questions(first.submission_id, STUDENT)
                .await
                .unwrap(),
        );
        assert_eq!(a, b);
        assert_eq!(a, vec![4, 3, 1, 6, 9, 10, 7, 8, 5, 2]);

        let other = h.sessions.start_exam(1, STUDENT + 1).await.unwrap();
        let c = order(
            h.sessions
                .get_exam_questions(other.submission_id, STUDENT + 1)
                .await
                .unwrap(),
        );
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_saved_answer_round_trips_into_question_view() {
        let h = Harness::new();
        two_question_exam(&h);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();

        let mut req = save(12, json!("C"));
        req.is_auto_save = true;
        let saved = h
            .sessions
            .save_answer(session.submission_id, STUDENT, req)
            .await
            .unwrap();
        assert_eq!(saved.message, "Answer auto-saved");

        let views = h
            .sessions
            .get_exam_questions(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert_eq!(views[0].question_id, 11);
        assert!(!views[0].is_answered);
        assert!(views[0].saved_answer.is_none());
        assert!(views[1].is_answered);
        assert_eq!(
            views[1].saved_answer.as_ref().unwrap().answer,
            Some(json!("C"))
        );
        assert!(views[1].options.iter().all(|o| o.key != "correctAnswer"));

        let submission = h
            .storage
            .get_submission_by_id(session.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.auto_save_count, 1);
        assert_eq!(submission.last_saved_at, Some(fixtures::t0()));
    }

    #[tokio::test]
    async fn test_manual_question_save_is_silent() {
        let h = Harness::new();
        let exam = fixtures::exam(1, vec![fixtures::qref(21, 1, 40)]);
        h.storage.insert_question(fixtures::essay(21));
        h.storage.insert_exam(exam);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();

        let saved = h
            .sessions
            .save_answer(
                session.submission_id,
                STUDENT,
                SaveAnswerRequest {
                    question_id: 21,
                    answer: None,
                    answer_text: Some("Ownership moves values".into()),
                    uploaded_file_url: None,
                    uploaded_file_name: None,
                    is_auto_save: false,
                },
            )
            .await
            .unwrap();
        assert!(!saved.is_graded);
        assert_eq!(saved.points_earned, None);

        let submitted = h
            .sessions
            .submit_exam(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert_eq!(submitted.pending_manual_grading, 1);
    }

    #[tokio::test]
    async fn test_save_after_deadline_force_submits() {
        let h = Harness::new();
        two_question_exam(&h);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        h.sessions
            .save_answer(session.submission_id, STUDENT, save(11, json!("B")))
            .await
            .unwrap();

        h.clock.advance(Duration::minutes(61));
        let err = h
            .sessions
            .save_answer(session.submission_id, STUDENT, save(12, json!("C")))
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::Expired(_)));

        let submission = h
            .storage
            .get_submission_by_id(session.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert!(submission.auto_submitted);
        assert_eq!(submission.total_score, Decimal::from(50));
        assert!(h.events.events().iter().any(|e| matches!(
            e,
            ExamEvent::SessionStatus {
                status: SubmissionStatus::Submitted,
                auto_submitted: true,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn test_text_only_save_keeps_earned_grade() {
        let h = Harness::new();
        two_question_exam(&h);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        h.sessions
            .save_answer(session.submission_id, STUDENT, save(11, json!("B")))
            .await
            .unwrap();

        let saved = h
            .sessions
            .save_answer(
                session.submission_id,
                STUDENT,
                SaveAnswerRequest {
                    question_id: 11,
                    answer: None,
                    answer_text: Some("second thoughts".into()),
                    uploaded_file_url: None,
                    uploaded_file_name: None,
                    is_auto_save: true,
                },
            )
            .await
            .unwrap();
        assert!(saved.is_graded);

        let submitted = h
            .sessions
            .submit_exam(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert_eq!(submitted.total_score, Decimal::from(50));
    }

    #[tokio::test]
    async fn test_question_outside_exam_is_not_found() {
        let h = Harness::new();
        two_question_exam(&h);
        h.storage.insert_question(fixtures::single_choice(99, "A"));
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        let err = h
            .sessions
            .save_answer(session.submission_id, STUDENT, save(99, json!("A")))
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_other_student_cannot_touch_submission() {
        let h = Harness::new();
        two_question_exam(&h);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        let err = h
            .sessions
            .get_exam_questions(session.submission_id, STUDENT + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::Forbidden(_)));
        let err = h
            .sessions
            .submit_exam(session.submission_id, STUDENT + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::Forbidden(_)));
        assert!(
            h.sessions
                .authorize_submission_stream(session.submission_id, STUDENT + 1)
                .await
                .is_err()
        );
        assert!(
            h.sessions
                .authorize_submission_stream(session.submission_id, STUDENT)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_pause_and_resume_extends_deadline() {
        let h = Harness::new();
        two_question_exam(&h);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        let teacher = Actor::teacher(TEACHER);

        let student_try = h
            .sessions
            .pause_exam(
                session.submission_id,
                &Actor::student(STUDENT),
                PauseExamRequest::default(),
            )
            .await;
        assert!(matches!(student_try, Err(ExamError::Forbidden(_))));

        let paused = h
            .sessions
            .pause_exam(session.submission_id, &teacher, PauseExamRequest::default())
            .await
            .unwrap();
        assert_eq!(paused.previous_status, SubmissionStatus::InProgress);
        assert_eq!(paused.status, SubmissionStatus::Paused);

        let err = h
            .sessions
            .pause_exam(session.submission_id, &teacher, PauseExamRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Can only pause IN_PROGRESS exams. Current status: PAUSED"
        );

        let blocked = h
            .sessions
            .save_answer(session.submission_id, STUDENT, save(11, json!("B")))
            .await;
        assert!(matches!(blocked, Err(ExamError::InvalidState(_))));

        let negative = h
            .sessions
            .resume_exam(
                session.submission_id,
                &teacher,
                ResumeExamRequest {
                    additional_minutes: Some(-5),
                },
            )
            .await;
        assert!(matches!(negative, Err(ExamError::Validation(_))));

        let resumed = h
            .sessions
            .resume_exam(
                session.submission_id,
                &teacher,
                ResumeExamRequest {
                    additional_minutes: Some(15),
                },
            )
            .await
            .unwrap();
        assert_eq!(resumed.status, SubmissionStatus::InProgress);
        assert_eq!(resumed.extra_minutes, 15);
        assert_eq!(
            resumed.must_submit_before,
            fixtures::t0() + Duration::minutes(75)
        );

        // 原截止时间之后、顺延截止时间之前仍可作答
        h.clock.advance(Duration::minutes(70));
        h.sessions
            .save_answer(session.submission_id, STUDENT, save(11, json!("B")))
            .await
            .unwrap();

        let err = h
            .sessions
            .resume_exam(
                session.submission_id,
                &teacher,
                ResumeExamRequest::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Can only resume PAUSED exams. Current status: IN_PROGRESS"
        );

        let timer_syncs = h
            .events
            .events()
            .into_iter()
            .filter(|e| matches!(e, ExamEvent::TimerSync { .. }))
            .count();
        assert_eq!(timer_syncs, 2);
    }

    #[tokio::test]
    async fn test_get_session_for_resume() {
        let h = Harness::new();
        two_question_exam(&h);
        let started = h.sessions.start_exam(1, STUDENT).await.unwrap();

        h.clock.advance(Duration::minutes(10));
        let eligibility = h.sessions.check_eligibility(1, STUDENT).await.unwrap();
        assert_eq!(eligibility.active_submission_id, Some(started.submission_id));

        let resumed = h
            .sessions
            .get_session(started.submission_id, STUDENT)
            .await
            .unwrap();
        assert_eq!(resumed.remaining_seconds, 50 * 60);

        h.sessions
            .submit_exam(started.submission_id, STUDENT)
            .await
            .unwrap();
        let err = h
            .sessions
            .get_session(started.submission_id, STUDENT)
            .await
            .unwrap_err();
        assert!(matches!(err, ExamError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_result_visibility_rules() {
        let h = Harness::new();
        let mut exam = two_question_exam(&h);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();

        let early = h.sessions.get_result(session.submission_id, STUDENT).await;
        assert!(matches!(early, Err(ExamError::InvalidState(_))));

        h.sessions
            .save_answer(session.submission_id, STUDENT, save(11, json!("B")))
            .await
            .unwrap();
        h.sessions
            .submit_exam(session.submission_id, STUDENT)
            .await
            .unwrap();

        let result = h
            .sessions
            .get_result(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert!(result.can_view_detailed);
        assert_eq!(result.correct_answers, None);
        assert_eq!(result.answered_questions, 1);
        assert_eq!(result.total_questions, 2);
        assert_eq!(
            result.message,
            "You did not pass this time. Keep practicing!"
        );
        let answers = result.answers.unwrap();
        assert_eq!(answers.len(), 2);
        assert!(answers.iter().all(|a| a.correct_answer.is_none()));

        exam.show_correct_answers = true;
        h.storage.insert_exam(exam.clone());
        let result = h
            .sessions
            .get_result(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert_eq!(result.correct_answers, Some(1));
        assert_eq!(result.incorrect_answers, Some(0));
        assert_eq!(
            result.answers.unwrap()[0].correct_answer.as_deref(),
            Some("B")
        );

        exam.show_score_only = true;
        h.storage.insert_exam(exam.clone());
        let result = h
            .sessions
            .get_result(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert!(!result.can_view_detailed);
        assert!(result.answers.is_none());

        exam.show_results_after_submit = false;
        h.storage.insert_exam(exam);
        let submitted = h
            .sessions
            .get_result(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert_eq!(submitted.submission_id, session.submission_id);
    }

    #[tokio::test]
    async fn test_sweeper_submits_only_expired_sessions() {
        let h = Harness::new();
        two_question_exam(&h);
        let early = h.sessions.start_exam(1, STUDENT).await.unwrap();
        h.clock.advance(Duration::minutes(30));
        let late = h.sessions.start_exam(1, STUDENT + 1).await.unwrap();

        h.clock.advance(Duration::minutes(31));
        assert_eq!(h.sessions.sweep_expired_submissions().await.unwrap(), 1);
        assert_eq!(h.sessions.sweep_expired_submissions().await.unwrap(), 0);

        let swept = h
            .storage
            .get_submission_by_id(early.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swept.status, SubmissionStatus::Submitted);
        assert!(swept.auto_submitted);
        let running = h
            .storage
            .get_submission_by_id(late.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(running.status, SubmissionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_event_failures_do_not_abort_operations() {
        let h = Harness::with_failing_events();
        two_question_exam(&h);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        h.sessions
            .save_answer(session.submission_id, STUDENT, save(11, json!("B")))
            .await
            .unwrap();
        h.sessions
            .submit_exam(session.submission_id, STUDENT)
            .await
            .unwrap();
        assert!(h.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_seeds_only_generated_when_enabled() {
        let h = Harness::with_seeds(vec![5, 6]);
        let mut exam = two_question_exam(&h);
        exam.randomize_options = true;
        h.storage.insert_exam(exam);
        let session = h.sessions.start_exam(1, STUDENT).await.unwrap();
        let submission = h
            .storage
            .get_submission_by_id(session.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(submission.question_seed, None);
        assert_eq!(submission.option_seed, Some(5));
        assert_eq!(submission.started_at, h.now());
    }
}
