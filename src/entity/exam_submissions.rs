//! 答卷实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub status: String,
    pub started_at: i64,
    pub submitted_at: Option<i64>,
    pub last_saved_at: Option<i64>,
    pub auto_save_count: i32,
    pub question_seed: Option<i64>,
    pub option_seed: Option<i64>,
    pub total_score: f64,
    pub max_score: f64,
    pub passed: bool,
    pub time_spent_seconds: Option<i64>,
    pub extra_minutes: i32,
    pub auto_submitted: bool,
    /// 活动答卷占位键，提交后置空
    #[sea_orm(unique)]
    pub active_lock: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
    #[sea_orm(has_many = "super::student_answers::Entity")]
    StudentAnswers,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::student_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAnswers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 活动答卷占位键
pub fn active_lock_key(student_id: i64, exam_id: i64) -> String {
    format!("{student_id}:{exam_id}")
}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_submission(self) -> crate::models::submissions::entities::Submission {
        use super::{to_datetime, to_optional_datetime};
        use crate::models::submissions::entities::{Submission, SubmissionStatus};
        use crate::utils::decimal::from_f64;

        Submission {
            id: self.id,
            exam_id: self.exam_id,
            student_id: self.student_id,
            attempt_number: self.attempt_number,
            status: self
                .status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Submitted),
            started_at: to_datetime(self.started_at),
            submitted_at: to_optional_datetime(self.submitted_at),
            last_saved_at: to_optional_datetime(self.last_saved_at),
            auto_save_count: self.auto_save_count,
            question_seed: self.question_seed,
            option_seed: self.option_seed,
            total_score: from_f64(self.total_score),
            max_score: from_f64(self.max_score),
            passed: self.passed,
            time_spent_seconds: self.time_spent_seconds,
            extra_minutes: self.extra_minutes,
            auto_submitted: self.auto_submitted,
        }
    }
}
