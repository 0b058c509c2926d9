//! 进程内存储实现
//!
//! 基于 DashMap 的嵌入式后端，用于测试与 `memory://` 部署。
//! 活动答卷唯一性与作答唯一性都通过索引表的 entry 原子操作保证。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Deserialize;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;

use crate::errors::{ExamError, Result};
use crate::models::{
    answers::entities::{Answer, AnswerWrite, GradingUpdate},
    exams::entities::{ExamDefinition, QuestionDefinition},
    submissions::entities::{NewSubmission, Submission, SubmissionStatus},
};
use crate::storage::{AnswerStore, ExamCatalog, SubmissionStore};

/// 目录种子文件格式
#[derive(Debug, Deserialize)]
struct CatalogSeed {
    #[serde(default)]
    exams: Vec<ExamDefinition>,
    #[serde(default)]
    questions: Vec<QuestionDefinition>,
}

#[derive(Default)]
pub struct MemoryStorage {
    exams: DashMap<i64, ExamDefinition>,
    questions: DashMap<i64, QuestionDefinition>,
    submissions: DashMap<i64, Submission>,
    answers: DashMap<i64, Answer>,
    /// (学生, 考试) -> 活动答卷ID
    active_index: DashMap<(i64, i64), i64>,
    /// (答卷, 题目) -> 作答ID
    answer_index: DashMap<(i64, i64), i64>,
    submission_seq: AtomicI64,
    answer_seq: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载考试与题目
    pub fn from_catalog_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExamError::database_config(format!("Failed to read catalog file {path}: {e}"))
        })?;
        let seed: CatalogSeed = serde_json::from_str(&content)?;
        let storage = Self::new();
        let (exam_count, question_count) = (seed.exams.len(), seed.questions.len());
        for exam in seed.exams {
            storage.insert_exam(exam);
        }
        for question in seed.questions {
            storage.insert_question(question);
        }
        info!(
            "Memory storage seeded from {} ({} exams, {} questions)",
            path, exam_count, question_count
        );
        Ok(storage)
    }

    pub fn insert_exam(&self, exam: ExamDefinition) {
        self.exams.insert(exam.id, exam);
    }

    pub fn insert_question(&self, question: QuestionDefinition) {
        self.questions.insert(question.id, question);
    }

    fn next_id(seq: &AtomicI64) -> i64 {
        seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait::async_trait]
impl SubmissionStore for MemoryStorage {
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        Ok(self.submissions.get(&id).map(|s| s.clone()))
    }

    async fn list_submissions_by_student_and_exam(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Vec<Submission>> {
        let mut result: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| s.student_id == student_id && s.exam_id == exam_id)
            .map(|s| s.clone())
            .collect();
        result.sort_by_key(|s| s.attempt_number);
        Ok(result)
    }

    async fn find_active_submission(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Option<Submission>> {
        let id = self.active_index.get(&(student_id, exam_id)).map(|id| *id);
        Ok(id.and_then(|id| self.submissions.get(&id).map(|s| s.clone())))
    }

    async fn list_submissions_by_exams(
        &self,
        exam_ids: &[i64],
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>> {
        let mut result: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| exam_ids.contains(&s.exam_id) && statuses.contains(&s.status))
            .map(|s| s.clone())
            .collect();
        result.sort_by_key(|s| s.id);
        Ok(result)
    }

    async fn list_submissions_by_status(
        &self,
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>> {
        let mut result: Vec<Submission> = self
            .submissions
            .iter()
            .filter(|s| statuses.contains(&s.status))
            .map(|s| s.clone())
            .collect();
        result.sort_by_key(|s| s.id);
        Ok(result)
    }

    async fn create_submission(&self, new: NewSubmission) -> Result<Submission> {
        match self.active_index.entry((new.student_id, new.exam_id)) {
            Entry::Occupied(existing) => Err(ExamError::invalid_state(format!(
                "An active submission is already in progress (submission {})",
                existing.get()
            ))),
            Entry::Vacant(slot) => {
                let id = Self::next_id(&self.submission_seq);
                let submission = Submission {
                    id,
                    exam_id: new.exam_id,
                    student_id: new.student_id,
                    attempt_number: new.attempt_number,
                    status: SubmissionStatus::InProgress,
                    started_at: new.started_at,
                    submitted_at: None,
                    last_saved_at: None,
                    auto_save_count: 0,
                    question_seed: new.question_seed,
                    option_seed: new.option_seed,
                    total_score: rust_decimal::Decimal::ZERO,
                    max_score: new.max_score,
                    passed: false,
                    time_spent_seconds: None,
                    extra_minutes: 0,
                    auto_submitted: false,
                };
                self.submissions.insert(id, submission.clone());
                slot.insert(id);
                Ok(submission)
            }
        }
    }

    async fn update_submission(&self, submission: &Submission) -> Result<Submission> {
        {
            let mut stored = self.submissions.get_mut(&submission.id).ok_or_else(|| {
                ExamError::not_found(format!("Submission {} not found", submission.id))
            })?;
            *stored = submission.clone();
        }
        if !submission.status.is_active() {
            self.active_index
                .remove_if(&(submission.student_id, submission.exam_id), |_, id| {
                    *id == submission.id
                });
        }
        Ok(submission.clone())
    }

    async fn touch_submission(&self, id: i64, saved_at: DateTime<Utc>) -> Result<()> {
        let mut stored = self
            .submissions
            .get_mut(&id)
            .ok_or_else(|| ExamError::not_found(format!("Submission {id} not found")))?;
        stored.last_saved_at = Some(saved_at);
        stored.auto_save_count = stored.auto_save_count.saturating_add(1);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AnswerStore for MemoryStorage {
    async fn get_answer_by_id(&self, id: i64) -> Result<Option<Answer>> {
        Ok(self.answers.get(&id).map(|a| a.clone()))
    }

    async fn list_answers_by_submission(&self, submission_id: i64) -> Result<Vec<Answer>> {
        let mut result: Vec<Answer> = self
            .answers
            .iter()
            .filter(|a| a.submission_id == submission_id)
            .map(|a| a.clone())
            .collect();
        result.sort_by_key(|a| a.id);
        Ok(result)
    }

    async fn find_answer(&self, submission_id: i64, question_id: i64) -> Result<Option<Answer>> {
        let id = self
            .answer_index
            .get(&(submission_id, question_id))
            .map(|id| *id);
        Ok(id.and_then(|id| self.answers.get(&id).map(|a| a.clone())))
    }

    async fn upsert_answer(&self, write: AnswerWrite, grading: GradingUpdate) -> Result<Answer> {
        let id = *self
            .answer_index
            .entry((write.submission_id, write.question_id))
            .or_insert_with(|| Self::next_id(&self.answer_seq));

        match self.answers.entry(id) {
            Entry::Occupied(mut existing) => {
                let answer = existing.get_mut();
                write.apply_to(answer);
                grading.apply_to(answer);
                Ok(answer.clone())
            }
            Entry::Vacant(slot) => {
                let mut answer = write.to_new_answer(id);
                grading.apply_to(&mut answer);
                slot.insert(answer.clone());
                Ok(answer)
            }
        }
    }

    async fn update_answer(&self, answer: &Answer) -> Result<Answer> {
        let mut stored = self
            .answers
            .get_mut(&answer.id)
            .ok_or_else(|| ExamError::not_found(format!("Answer {} not found", answer.id)))?;
        *stored = answer.clone();
        Ok(answer.clone())
    }
}

#[async_trait::async_trait]
impl ExamCatalog for MemoryStorage {
    async fn get_exam(&self, exam_id: i64) -> Result<Option<ExamDefinition>> {
        Ok(self.exams.get(&exam_id).map(|e| e.clone()))
    }

    async fn get_question(&self, question_id: i64) -> Result<Option<QuestionDefinition>> {
        Ok(self.questions.get(&question_id).map(|q| q.clone()))
    }

    async fn list_exam_ids_managed_by(&self, teacher_id: Option<i64>) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = self
            .exams
            .iter()
            .filter(|e| match teacher_id {
                Some(t) => e.created_by == t || e.class_teacher_id == Some(t),
                None => true,
            })
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
