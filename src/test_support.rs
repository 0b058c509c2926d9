//! 测试共用的夹具与替身

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::config::{MonitorPolicy, RiskPolicy, SessionPolicy};
use crate::errors::{ExamError, Result};
use crate::services::events::{EventPublisher, ExamEvent};
use crate::services::{ExamSessionService, GradingService, MonitorService, ServiceContext};
use crate::storage::memory_storage::MemoryStorage;
use crate::utils::{KeyedLock, ManualClock, SequenceRandom};

pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::models::answers::entities::Answer;
    use crate::models::exams::entities::{
        ExamDefinition, ExamQuestionRef, QuestionDefinition, QuestionType,
    };
    use crate::models::submissions::entities::{Submission, SubmissionStatus};

    /// 固定的“当前时间”
    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    /// 已发布、时长 60 分钟、满分 100、及格 60 的考试
    pub fn exam(id: i64, questions: Vec<ExamQuestionRef>) -> ExamDefinition {
        ExamDefinition {
            id,
            title: format!("Exam {id}"),
            created_by: 100,
            class_teacher_id: Some(101),
            start_time: None,
            end_time: None,
            is_published: true,
            duration_minutes: 60,
            total_score: Decimal::from(100),
            passing_score: Some(Decimal::from(60)),
            randomize_questions: false,
            randomize_options: false,
            show_score_only: false,
            show_correct_answers: false,
            allow_review_after_submit: true,
            show_results_after_submit: true,
            max_attempts: 0,
            questions,
        }
    }

    pub fn qref(question_id: i64, order: i32, points: i64) -> ExamQuestionRef {
        ExamQuestionRef {
            question_id,
            order,
            points: Some(Decimal::from(points)),
        }
    }

    pub fn single_choice(id: i64, correct: &str) -> QuestionDefinition {
        QuestionDefinition {
            id,
            question_type: QuestionType::SingleChoice,
            question_text: format!("Single choice {id}"),
            options: Some(json!({
                "A": "first",
                "B": "second",
                "C": "third",
                "D": "fourth",
                "correctAnswer": correct,
            })),
            correct_answer: Some(correct.to_string()),
        }
    }

    pub fn multi_select(id: i64, correct: &[&str]) -> QuestionDefinition {
        QuestionDefinition {
            id,
            question_type: QuestionType::MultiSelect,
            question_text: format!("Multi select {id}"),
            options: Some(json!({"A": "a", "B": "b", "C": "c", "D": "d"})),
            correct_answer: Some(json!(correct).to_string()),
        }
    }

    pub fn true_false(id: i64, correct: bool) -> QuestionDefinition {
        QuestionDefinition {
            id,
            question_type: QuestionType::TrueFalse,
            question_text: format!("True or false {id}"),
            options: None,
            correct_answer: Some(correct.to_string()),
        }
    }

    pub fn essay(id: i64) -> QuestionDefinition {
        QuestionDefinition {
            id,
            question_type: QuestionType::Essay,
            question_text: format!("Essay {id}"),
            options: None,
            correct_answer: None,
        }
    }

    pub fn submission(
        id: i64,
        exam_id: i64,
        student_id: i64,
        status: SubmissionStatus,
    ) -> Submission {
        Submission {
            id,
            exam_id,
            student_id,
            attempt_number: 1,
            status,
            started_at: t0(),
            submitted_at: status.is_submitted().then(t0),
            last_saved_at: None,
            auto_save_count: 0,
            question_seed: None,
            option_seed: None,
            total_score: Decimal::ZERO,
            max_score: Decimal::from(100),
            passed: false,
            time_spent_seconds: None,
            extra_minutes: 0,
            auto_submitted: false,
        }
    }

    pub fn graded_answer(id: i64, question_id: i64, points: Option<Decimal>) -> Answer {
        Answer {
            id,
            submission_id: 1,
            question_id,
            answer_json: Some(json!("A")),
            answer_text: None,
            uploaded_file_url: None,
            uploaded_file_name: None,
            is_correct: points.map(|p| p > Decimal::ZERO),
            points_earned: points,
            max_points: None,
            teacher_feedback: None,
            graded_by: None,
            graded_at: None,
            saved_count: 1,
            first_saved_at: t0(),
            last_saved_at: t0(),
        }
    }
}

/// 记录收到的全部事件
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<ExamEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ExamEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: ExamEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// 总是失败的发布器
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    fn publish(&self, _event: ExamEvent) -> Result<()> {
        Err(ExamError::serialization("publisher offline"))
    }
}

/// 基于内存存储与手动时钟组装的全部服务
pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub clock: Arc<ManualClock>,
    pub events: Arc<RecordingPublisher>,
    pub sessions: ExamSessionService,
    pub grading: GradingService,
    pub monitor: MonitorService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_seeds(vec![12345, 54321])
    }

    pub fn with_seeds(seeds: Vec<i64>) -> Self {
        Self::build(seeds, Arc::new(RecordingPublisher::default()), None)
    }

    /// 事件发布总是失败
    pub fn with_failing_events() -> Self {
        Self::build(
            vec![12345, 54321],
            Arc::new(RecordingPublisher::default()),
            Some(Arc::new(FailingPublisher)),
        )
    }

    fn build(
        seeds: Vec<i64>,
        events: Arc<RecordingPublisher>,
        publisher: Option<Arc<dyn EventPublisher>>,
    ) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(fixtures::t0()));
        let ctx = ServiceContext {
            storage: storage.clone(),
            catalog: storage.clone(),
            clock: clock.clone(),
            random: Arc::new(SequenceRandom::new(seeds)),
            events: publisher.unwrap_or_else(|| events.clone() as Arc<dyn EventPublisher>),
            locks: Arc::new(KeyedLock::new()),
        };
        let policy = SessionPolicy::default();
        Self {
            sessions: ExamSessionService::new(ctx.clone(), policy.clone()),
            grading: GradingService::new(ctx.clone(), &policy),
            monitor: MonitorService::new(ctx, MonitorPolicy::default(), RiskPolicy::default()),
            storage,
            clock,
            events,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        use crate::utils::Clock;
        self.clock.now()
    }
}
