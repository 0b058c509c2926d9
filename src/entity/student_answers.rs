//! 作答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub question_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub answer_json: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub answer_text: Option<String>,
    pub uploaded_file_url: Option<String>,
    pub uploaded_file_name: Option<String>,
    pub is_correct: Option<bool>,
    pub points_earned: Option<f64>,
    pub max_points: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub teacher_feedback: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<i64>,
    pub saved_count: i32,
    pub first_saved_at: i64,
    pub last_saved_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam_submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::exam_submissions::Column::Id"
    )]
    Submission,
    #[sea_orm(
        belongs_to = "super::questions::Entity",
        from = "Column::QuestionId",
        to = "super::questions::Column::Id"
    )]
    Question,
}

impl Related<super::exam_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_answer(self) -> crate::models::answers::entities::Answer {
        use super::{to_datetime, to_optional_datetime};
        use crate::models::answers::entities::Answer;
        use crate::utils::decimal::from_f64;

        Answer {
            id: self.id,
            submission_id: self.submission_id,
            question_id: self.question_id,
            answer_json: self
                .answer_json
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            answer_text: self.answer_text,
            uploaded_file_url: self.uploaded_file_url,
            uploaded_file_name: self.uploaded_file_name,
            is_correct: self.is_correct,
            points_earned: self.points_earned.map(from_f64),
            max_points: self.max_points.map(from_f64),
            teacher_feedback: self.teacher_feedback,
            graded_by: self.graded_by,
            graded_at: to_optional_datetime(self.graded_at),
            saved_count: self.saved_count,
            first_saved_at: to_datetime(self.first_saved_at),
            last_saved_at: to_datetime(self.last_saved_at),
        }
    }
}
