//! 考试目录查询（只读）

use super::SeaOrmStorage;
use crate::entity::exam_questions::{Column as ExamQuestionColumn, Entity as ExamQuestions};
use crate::entity::exams::{Column as ExamColumn, Entity as Exams};
use crate::entity::questions::Entity as Questions;
use crate::errors::{ExamError, Result};
use crate::models::exams::entities::{ExamDefinition, QuestionDefinition};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::warn;

impl SeaOrmStorage {
    /// 获取考试定义（含题目引用）
    pub async fn get_exam_impl(&self, exam_id: i64) -> Result<Option<ExamDefinition>> {
        let Some(exam) = Exams::find_by_id(exam_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询考试失败: {e}")))?
        else {
            return Ok(None);
        };

        let questions = ExamQuestions::find()
            .filter(ExamQuestionColumn::ExamId.eq(exam_id))
            .order_by_asc(ExamQuestionColumn::QuestionOrder)
            .order_by_asc(ExamQuestionColumn::QuestionId)
            .all(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询考试题目失败: {e}")))?;

        Ok(Some(exam.into_exam(
            questions.into_iter().map(|q| q.into_question_ref()).collect(),
        )))
    }

    /// 获取题目定义
    pub async fn get_question_impl(&self, question_id: i64) -> Result<Option<QuestionDefinition>> {
        let result = Questions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询题目失败: {e}")))?;

        Ok(result.and_then(|m| {
            let id = m.id;
            let raw_type = m.question_type.clone();
            let question = m.into_question();
            if question.is_none() {
                warn!("Question {} has unknown type {}, ignored", id, raw_type);
            }
            question
        }))
    }

    /// 列出教师可管理的考试 ID
    pub async fn list_exam_ids_managed_by_impl(&self, teacher_id: Option<i64>) -> Result<Vec<i64>> {
        let mut select = Exams::find()
            .select_only()
            .column(ExamColumn::Id)
            .order_by_asc(ExamColumn::Id);

        if let Some(teacher_id) = teacher_id {
            select = select.filter(
                Condition::any()
                    .add(ExamColumn::CreatedBy.eq(teacher_id))
                    .add(ExamColumn::ClassTeacherId.eq(teacher_id)),
            );
        }

        select
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询可管理考试失败: {e}")))
    }
}
