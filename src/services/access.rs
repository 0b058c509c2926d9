//! 资源加载与归属校验

use crate::errors::{ExamError, Result};
use crate::models::actors::Actor;
use crate::models::exams::entities::ExamDefinition;
use crate::models::submissions::entities::Submission;
use crate::storage::{ExamCatalog, SubmissionStore};

pub async fn load_exam(catalog: &dyn ExamCatalog, exam_id: i64) -> Result<ExamDefinition> {
    catalog
        .get_exam(exam_id)
        .await?
        .ok_or_else(|| ExamError::not_found(format!("Exam {exam_id} not found")))
}

pub async fn load_submission(store: &dyn SubmissionStore, submission_id: i64) -> Result<Submission> {
    store
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| ExamError::not_found(format!("Submission {submission_id} not found")))
}

/// 学生只能操作自己的答卷
pub async fn load_owned_submission(
    store: &dyn SubmissionStore,
    submission_id: i64,
    student_id: i64,
) -> Result<Submission> {
    let submission = load_submission(store, submission_id).await?;
    if submission.student_id != student_id {
        return Err(ExamError::forbidden("This submission does not belong to you"));
    }
    Ok(submission)
}

pub fn ensure_can_manage(exam: &ExamDefinition, actor: &Actor) -> Result<()> {
    if actor.role.is_staff() && exam.can_be_managed_by(actor) {
        Ok(())
    } else {
        Err(ExamError::forbidden(format!(
            "You are not allowed to manage exam {}",
            exam.id
        )))
    }
}

/// 教师侧操作：加载答卷与所属考试并校验管理权限
pub async fn load_managed_submission(
    store: &dyn SubmissionStore,
    catalog: &dyn ExamCatalog,
    submission_id: i64,
    actor: &Actor,
) -> Result<(Submission, ExamDefinition)> {
    let submission = load_submission(store, submission_id).await?;
    let exam = load_exam(catalog, submission.exam_id).await?;
    ensure_can_manage(&exam, actor)?;
    Ok((submission, exam))
}

/// 教师可见的考试范围；管理员与部门主管不受限
pub async fn managed_exam_ids(catalog: &dyn ExamCatalog, actor: &Actor) -> Result<Vec<i64>> {
    if actor.role.is_supervisor() {
        catalog.list_exam_ids_managed_by(None).await
    } else if actor.role.is_staff() {
        catalog.list_exam_ids_managed_by(Some(actor.id)).await
    } else {
        Err(ExamError::forbidden("Only teaching staff can access this resource"))
    }
}
