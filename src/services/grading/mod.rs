pub mod autograde;
pub mod detail;
pub mod finalize;
pub mod grade;
pub mod list;
pub mod points;
pub mod scoring;
pub mod stats;

use rust_decimal::Decimal;

use super::ServiceContext;
use crate::config::SessionPolicy;
use crate::errors::Result;
use crate::models::actors::Actor;
use crate::models::answers::entities::Answer;
use crate::models::grading::{
    requests::{GradeAnswerRequest, GradingListQuery},
    responses::{
        FinalizeGradingResponse, GradedAnswerResponse, GradingListResponse, GradingStatsResponse,
        SubmissionGradingDetail,
    },
};
use crate::storage::ExamCatalog;
use crate::utils::decimal::from_f64;

/// 阅卷流程
pub struct GradingService {
    pub(crate) ctx: ServiceContext,
    pub(crate) fallback_max_points: Decimal,
}

impl GradingService {
    pub fn new(ctx: ServiceContext, policy: &SessionPolicy) -> Self {
        Self {
            ctx,
            fallback_max_points: from_f64(policy.fallback_max_points),
        }
    }

    /// 阅卷队列
    pub async fn list_for_grading(
        &self,
        actor: &Actor,
        query: GradingListQuery,
    ) -> Result<GradingListResponse> {
        list::list_for_grading(self, actor, query).await
    }

    /// 阅卷详情
    pub async fn get_submission_detail(
        &self,
        submission_id: i64,
        actor: &Actor,
    ) -> Result<SubmissionGradingDetail> {
        detail::get_submission_detail(self, submission_id, actor).await
    }

    /// 教师给分
    pub async fn grade_answer(
        &self,
        answer_id: i64,
        actor: &Actor,
        req: GradeAnswerRequest,
    ) -> Result<GradedAnswerResponse> {
        grade::grade_answer(self, answer_id, actor, req).await
    }

    /// 完成阅卷
    pub async fn finalize_grading(
        &self,
        submission_id: i64,
        actor: &Actor,
    ) -> Result<FinalizeGradingResponse> {
        finalize::finalize_grading(self, submission_id, actor).await
    }

    /// 阅卷统计
    pub async fn get_grading_stats(
        &self,
        exam_id: i64,
        actor: &Actor,
    ) -> Result<GradingStatsResponse> {
        stats::get_grading_stats(self, exam_id, actor).await
    }
}

/// 需要人工阅卷且尚未给分的作答数
pub async fn count_pending_manual(catalog: &dyn ExamCatalog, answers: &[Answer]) -> Result<usize> {
    let mut pending = 0;
    for answer in answers.iter().filter(|a| a.points_earned.is_none()) {
        if let Some(question) = catalog.get_question(answer.question_id).await?
            && question.question_type.requires_manual_grading()
        {
            pending += 1;
        }
    }
    Ok(pending)
}
