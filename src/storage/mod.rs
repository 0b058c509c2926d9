//! 数据存储层
//!
//! 核心流程只依赖三个存储契约：答卷、作答与只读的考试目录。
//! 后端有两种实现：SeaORM（SQLite/PostgreSQL/MySQL）与进程内存储。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    answers::entities::{Answer, AnswerWrite, GradingUpdate},
    exams::entities::{ExamDefinition, QuestionDefinition},
    submissions::entities::{NewSubmission, Submission, SubmissionStatus},
};

pub mod memory_storage;
pub mod sea_orm_storage;

/// 答卷存储
#[async_trait::async_trait]
pub trait SubmissionStore: Send + Sync {
    // 通过ID获取答卷
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 获取学生在某考试下的全部答卷（按次数升序）
    async fn list_submissions_by_student_and_exam(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Vec<Submission>>;
    // 获取学生在某考试下进行中/暂停的答卷
    async fn find_active_submission(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Option<Submission>>;
    // 按考试与状态列出答卷
    async fn list_submissions_by_exams(
        &self,
        exam_ids: &[i64],
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>>;
    // 按状态列出所有答卷
    async fn list_submissions_by_status(
        &self,
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>>;
    /// 创建答卷
    ///
    /// 同一 (学生, 考试) 已存在活动答卷时返回 `InvalidState`。
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission>;
    // 保存答卷（整体覆盖可变字段）
    async fn update_submission(&self, submission: &Submission) -> Result<Submission>;
    // 记录一次保存：更新最后保存时间并累加保存计数
    async fn touch_submission(
        &self,
        id: i64,
        saved_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()>;
}

/// 作答存储
#[async_trait::async_trait]
pub trait AnswerStore: Send + Sync {
    // 通过ID获取作答
    async fn get_answer_by_id(&self, id: i64) -> Result<Option<Answer>>;
    // 获取答卷的全部作答
    async fn list_answers_by_submission(&self, submission_id: i64) -> Result<Vec<Answer>>;
    // 按 (答卷, 题目) 获取作答
    async fn find_answer(&self, submission_id: i64, question_id: i64) -> Result<Option<Answer>>;
    /// 查找或创建作答并写入
    ///
    /// 对同一 (答卷, 题目) 的并发调用必须只产生一条记录，载荷后写覆盖。
    async fn upsert_answer(&self, write: AnswerWrite, grading: GradingUpdate) -> Result<Answer>;
    // 保存作答（阅卷字段）
    async fn update_answer(&self, answer: &Answer) -> Result<Answer>;
}

/// 考试目录（只读）
#[async_trait::async_trait]
pub trait ExamCatalog: Send + Sync {
    // 获取考试定义（含题目列表与分值）
    async fn get_exam(&self, exam_id: i64) -> Result<Option<ExamDefinition>>;
    // 获取题目定义
    async fn get_question(&self, question_id: i64) -> Result<Option<QuestionDefinition>>;
    // 列出教师可管理的考试；None 表示全部
    async fn list_exam_ids_managed_by(&self, teacher_id: Option<i64>) -> Result<Vec<i64>>;
}

/// 完整存储后端
pub trait Storage: SubmissionStore + AnswerStore + ExamCatalog {}

impl<T> Storage for T where T: SubmissionStore + AnswerStore + ExamCatalog {}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let url = &AppConfig::get().database.url;
    if let Some(seed) = url.strip_prefix("memory://") {
        let storage = if seed.is_empty() {
            memory_storage::MemoryStorage::new()
        } else {
            memory_storage::MemoryStorage::from_catalog_file(seed)?
        };
        return Ok(Arc::new(storage));
    }
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
