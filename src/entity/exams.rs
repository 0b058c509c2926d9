//! 考试实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub subject_class_id: Option<i64>,
    pub class_teacher_id: Option<i64>,
    pub created_by: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub duration_minutes: i32,
    pub total_score: f64,
    pub passing_score: Option<f64>,
    pub randomize_questions: bool,
    pub randomize_options: bool,
    pub show_score_only: bool,
    pub show_correct_answers: bool,
    pub allow_review_after_submit: bool,
    pub show_results_after_submit: bool,
    pub max_attempts: i32,
    pub is_published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam_questions::Entity")]
    ExamQuestions,
    #[sea_orm(has_many = "super::exam_submissions::Entity")]
    ExamSubmissions,
}

impl Related<super::exam_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamQuestions.def()
    }
}

impl Related<super::exam_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamSubmissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_exam(
        self,
        questions: Vec<crate::models::exams::entities::ExamQuestionRef>,
    ) -> crate::models::exams::entities::ExamDefinition {
        use super::to_optional_datetime;
        use crate::models::exams::entities::ExamDefinition;
        use crate::utils::decimal::from_f64;

        ExamDefinition {
            id: self.id,
            title: self.title,
            created_by: self.created_by,
            class_teacher_id: self.class_teacher_id,
            start_time: to_optional_datetime(self.start_time),
            end_time: to_optional_datetime(self.end_time),
            is_published: self.is_published,
            duration_minutes: self.duration_minutes,
            total_score: from_f64(self.total_score),
            passing_score: self.passing_score.map(from_f64),
            randomize_questions: self.randomize_questions,
            randomize_options: self.randomize_options,
            show_score_only: self.show_score_only,
            show_correct_answers: self.show_correct_answers,
            allow_review_after_submit: self.allow_review_after_submit,
            show_results_after_submit: self.show_results_after_submit,
            max_attempts: self.max_attempts,
            questions,
        }
    }
}
