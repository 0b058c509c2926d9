//! 题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub question_type: String,
    #[sea_orm(column_type = "Text")]
    pub question_text: String,
    /// 选项 JSON 文本
    #[sea_orm(column_type = "Text", nullable)]
    pub options: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub correct_answer: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam_questions::Entity")]
    ExamQuestions,
}

impl Related<super::exam_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamQuestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    /// 题型无法识别时返回 None
    pub fn into_question(self) -> Option<crate::models::exams::entities::QuestionDefinition> {
        use crate::models::exams::entities::{QuestionDefinition, QuestionType};

        let question_type = self.question_type.parse::<QuestionType>().ok()?;
        Some(QuestionDefinition {
            id: self.id,
            question_type,
            question_text: self.question_text,
            options: self
                .options
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            correct_answer: self.correct_answer,
        })
    }
}
