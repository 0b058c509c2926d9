use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::exams::entities::{ExamDefinition, QuestionDefinition};
use crate::storage::ExamCatalog;

/// 带缓存的考试目录
///
/// 只缓存命中的定义，不存在的 ID 每次都回源。
pub struct CachedCatalog {
    inner: Arc<dyn ExamCatalog>,
    exams: Cache<i64, ExamDefinition>,
    questions: Cache<i64, QuestionDefinition>,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn ExamCatalog>, max_capacity: u64, ttl_seconds: u64) -> Self {
        fn build<V: Clone + Send + Sync + 'static>(
            max_capacity: u64,
            ttl_seconds: u64,
        ) -> moka::future::CacheBuilder<i64, V, Cache<i64, V>> {
            Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(ttl_seconds))
        }

        debug!(
            "CachedCatalog initialized with max capacity: {}, ttl: {}s",
            max_capacity, ttl_seconds
        );
        Self {
            inner,
            exams: build(max_capacity, ttl_seconds).build(),
            questions: build(max_capacity, ttl_seconds).build(),
        }
    }

    pub fn from_config(inner: Arc<dyn ExamCatalog>) -> Self {
        let config = AppConfig::get();
        Self::new(inner, config.cache.max_capacity, config.cache.default_ttl)
    }

    /// 考试定义被修改后调用
    pub async fn invalidate_exam(&self, exam_id: i64) {
        self.exams.invalidate(&exam_id).await;
    }

    pub fn invalidate_all(&self) {
        self.exams.invalidate_all();
        self.questions.invalidate_all();
    }
}

#[async_trait]
impl ExamCatalog for CachedCatalog {
    async fn get_exam(&self, exam_id: i64) -> Result<Option<ExamDefinition>> {
        if let Some(exam) = self.exams.get(&exam_id).await {
            debug!("Exam {} served from cache", exam_id);
            return Ok(Some(exam));
        }
        let exam = self.inner.get_exam(exam_id).await?;
        if let Some(exam) = &exam {
            self.exams.insert(exam_id, exam.clone()).await;
        }
        Ok(exam)
    }

    async fn get_question(&self, question_id: i64) -> Result<Option<QuestionDefinition>> {
        if let Some(question) = self.questions.get(&question_id).await {
            return Ok(Some(question));
        }
        let question = self.inner.get_question(question_id).await?;
        if let Some(question) = &question {
            self.questions.insert(question_id, question.clone()).await;
        }
        Ok(question)
    }

    async fn list_exam_ids_managed_by(&self, teacher_id: Option<i64>) -> Result<Vec<i64>> {
        self.inner.list_exam_ids_managed_by(teacher_id).await
    }
}
