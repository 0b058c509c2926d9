//! 作答存储操作

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::student_answers::{ActiveModel, Column, Entity as StudentAnswers};
use crate::errors::{ExamError, Result};
use crate::models::answers::entities::{Answer, AnswerWrite, GradingUpdate};
use crate::utils::decimal::to_f64;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, Unchanged,
};

/// 业务作答 -> 可写模型（除主键外全部字段）
fn to_active_model(answer: &Answer) -> Result<ActiveModel> {
    let answer_json = answer
        .answer_json
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    Ok(ActiveModel {
        submission_id: Set(answer.submission_id),
        question_id: Set(answer.question_id),
        answer_json: Set(answer_json),
        answer_text: Set(answer.answer_text.clone()),
        uploaded_file_url: Set(answer.uploaded_file_url.clone()),
        uploaded_file_name: Set(answer.uploaded_file_name.clone()),
        is_correct: Set(answer.is_correct),
        points_earned: Set(answer.points_earned.map(to_f64)),
        max_points: Set(answer.max_points.map(to_f64)),
        teacher_feedback: Set(answer.teacher_feedback.clone()),
        graded_by: Set(answer.graded_by),
        graded_at: Set(answer.graded_at.map(|t| t.timestamp())),
        saved_count: Set(answer.saved_count),
        first_saved_at: Set(answer.first_saved_at.timestamp()),
        last_saved_at: Set(answer.last_saved_at.timestamp()),
        ..Default::default()
    })
}

impl SeaOrmStorage {
    /// 通过 ID 获取作答
    pub async fn get_answer_by_id_impl(&self, id: i64) -> Result<Option<Answer>> {
        let result = StudentAnswers::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询作答失败: {e}")))?;

        Ok(result.map(|m| m.into_answer()))
    }

    /// 获取答卷的全部作答
    pub async fn list_answers_by_submission_impl(&self, submission_id: i64) -> Result<Vec<Answer>> {
        let results = StudentAnswers::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询作答列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_answer()).collect())
    }

    /// 按 (答卷, 题目) 获取作答
    pub async fn find_answer_impl(
        &self,
        submission_id: i64,
        question_id: i64,
    ) -> Result<Option<Answer>> {
        let result = StudentAnswers::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .filter(Column::QuestionId.eq(question_id))
            .one(&self.db)
            .await
            .map_err(|e| ExamError::database_operation(format!("查询作答失败: {e}")))?;

        Ok(result.map(|m| m.into_answer()))
    }

    /// 查找或创建作答
    ///
    /// 并发首次写入时由唯一索引兜底：插入冲突后改为更新已存在的记录。
    pub async fn upsert_answer_impl(
        &self,
        write: AnswerWrite,
        grading: GradingUpdate,
    ) -> Result<Answer> {
        if let Some(mut existing) = self
            .find_answer_impl(write.submission_id, write.question_id)
            .await?
        {
            write.apply_to(&mut existing);
            grading.apply_to(&mut existing);
            return self.update_answer_impl(&existing).await;
        }

        let mut fresh = write.to_new_answer(0);
        grading.apply_to(&mut fresh);
        match to_active_model(&fresh)?.insert(&self.db).await {
            Ok(model) => Ok(model.into_answer()),
            Err(e) if is_unique_violation(&e) => {
                let mut existing = self
                    .find_answer_impl(write.submission_id, write.question_id)
                    .await?
                    .ok_or_else(|| ExamError::database_operation(format!("保存作答失败: {e}")))?;
                write.apply_to(&mut existing);
                grading.apply_to(&mut existing);
                self.update_answer_impl(&existing).await
            }
            Err(e) => Err(ExamError::database_operation(format!("保存作答失败: {e}"))),
        }
    }

    /// 保存作答
    pub async fn update_answer_impl(&self, answer: &Answer) -> Result<Answer> {
        let mut model = to_active_model(answer)?;
        model.id = Unchanged(answer.id);

        let result = model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ExamError::not_found(format!("Answer {} not found", answer.id)),
            e => ExamError::database_operation(format!("更新作答失败: {e}")),
        })?;

        Ok(result.into_answer())
    }
}
