//! 答卷存储操作

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::exam_submissions::{ActiveModel, Column, Entity as ExamSubmissions, active_lock_key};
use crate::errors::{ExamError, Result};
use crate::models::submissions::entities::{NewSubmission, Submission, SubmissionStatus};
use crate::utils::decimal::to_f64;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, Unchanged,
};

fn status_strings(statuses: &[SubmissionStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.to_string()).collect()
}

impl SeaOrmStorage {
    /// 通过 ID 获取答卷
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = ExamSubmissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询答卷失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 获取学生某考试的全部答卷
    pub async fn list_submissions_by_student_and_exam_impl(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Vec<Submission>> {
        let results = ExamSubmissions::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::ExamId.eq(exam_id))
            .order_by_asc(Column::AttemptNumber)
            .all(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询答卷历史失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 获取活动答卷
    pub async fn find_active_submission_impl(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Option<Submission>> {
        let result = ExamSubmissions::find()
            .filter(Column::ActiveLock.eq(active_lock_key(student_id, exam_id)))
            .one(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询活动答卷失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 按考试与状态列出答卷
    pub async fn list_submissions_by_exams_impl(
        &self,
        exam_ids: &[i64],
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>> {
        if exam_ids.is_empty() || statuses.is_empty() {
            return Ok(Vec::new());
        }
        let results = ExamSubmissions::find()
            .filter(Column::ExamId.is_in(exam_ids.to_vec()))
            .filter(Column::Status.is_in(status_strings(statuses)))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询答卷列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 按状态列出答卷
    pub async fn list_submissions_by_status_impl(
        &self,
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let results = ExamSubmissions::find()
            .filter(Column::Status.is_in(status_strings(statuses)))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询答卷列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 创建答卷，活动占位键冲突时拒绝
    pub async fn create_submission_impl(&self, new: NewSubmission) -> Result<Submission> {
        let now = Utc::now().timestamp();

        let model = ActiveModel {
            exam_id: Set(new.exam_id),
            student_id: Set(new.student_id),
            attempt_number: Set(new.attempt_number),
            status: Set(SubmissionStatus::InProgress.to_string()),
            started_at: Set(new.started_at.timestamp()),
            submitted_at: Set(None),
            last_saved_at: Set(None),
            auto_save_count: Set(0),
            question_seed: Set(new.question_seed),
            option_seed: Set(new.option_seed),
            total_score: Set(0.0),
            max_score: Set(to_f64(new.max_score)),
            passed: Set(false),
            time_spent_seconds: Set(None),
            extra_minutes: Set(0),
            auto_submitted: Set(false),
            active_lock: Set(Some(active_lock_key(new.student_id, new.exam_id))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ExamError::invalid_state("An active submission is already in progress")
            } else {
                ExamError::database_operation(format!("创建答卷失败: {e}"))
            }
        })?;

        Ok(result.into_submission())
    }

    /// 保存答卷的可变字段
    pub async fn update_submission_impl(&self, submission: &Submission) -> Result<Submission> {
        let active_lock = submission
            .status
            .is_active()
            .then(|| active_lock_key(submission.student_id, submission.exam_id));

        let model = ActiveModel {
            id: Unchanged(submission.id),
            status: Set(submission.status.to_string()),
            submitted_at: Set(submission.submitted_at.map(|t| t.timestamp())),
            last_saved_at: Set(submission.last_saved_at.map(|t| t.timestamp())),
            auto_save_count: Set(submission.auto_save_count),
            total_score: Set(to_f64(submission.total_score)),
            max_score: Set(to_f64(submission.max_score)),
            passed: Set(submission.passed),
            time_spent_seconds: Set(submission.time_spent_seconds),
            extra_minutes: Set(submission.extra_minutes),
            auto_submitted: Set(submission.auto_submitted),
            active_lock: Set(active_lock),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => {
                ExamError::not_found(format!("Submission {} not found", submission.id))
            }
            e => ExamError::database_operation(format!("更新答卷失败: {e}")),
        })?;

        Ok(result.into_submission())
    }

    /// 记录一次保存
    pub async fn touch_submission_impl(&self, id: i64, saved_at: DateTime<Utc>) -> Result<()> {
        let result = ExamSubmissions::update_many()
            .col_expr(
                Column::LastSavedAt,
                sea_orm::sea_query::Expr::value(saved_at.timestamp()),
            )
            .col_expr(
                Column::AutoSaveCount,
                sea_orm::sea_query::Expr::cust("auto_save_count + 1"),
            )
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("更新保存记录失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(ExamError::not_found(format!("Submission {id} not found")));
        }
        Ok(())
    }
}
