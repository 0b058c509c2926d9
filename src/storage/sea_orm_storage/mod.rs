//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod answers;
mod catalog;
mod submissions;

use crate::config::AppConfig;
use crate::errors::{ExamError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ExamError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 使用已有连接（调用方负责迁移）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ExamError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ExamError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ExamError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ExamError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, memory://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 唯一约束冲突
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// Storage trait 实现
use crate::models::{
    answers::entities::{Answer, AnswerWrite, GradingUpdate},
    exams::entities::{ExamDefinition, QuestionDefinition},
    submissions::entities::{NewSubmission, Submission, SubmissionStatus},
};
use crate::storage::{AnswerStore, ExamCatalog, SubmissionStore};
use async_trait::async_trait;

#[async_trait]
impl SubmissionStore for SeaOrmStorage {
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn list_submissions_by_student_and_exam(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_student_and_exam_impl(student_id, exam_id)
            .await
    }

    async fn find_active_submission(
        &self,
        student_id: i64,
        exam_id: i64,
    ) -> Result<Option<Submission>> {
        self.find_active_submission_impl(student_id, exam_id).await
    }

    async fn list_submissions_by_exams(
        &self,
        exam_ids: &[i64],
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_exams_impl(exam_ids, statuses).await
    }

    async fn list_submissions_by_status(
        &self,
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_status_impl(statuses).await
    }

    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn update_submission(&self, submission: &Submission) -> Result<Submission> {
        self.update_submission_impl(submission).await
    }

    async fn touch_submission(
        &self,
        id: i64,
        saved_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        self.touch_submission_impl(id, saved_at).await
    }
}

#[async_trait]
impl AnswerStore for SeaOrmStorage {
    async fn get_answer_by_id(&self, id: i64) -> Result<Option<Answer>> {
        self.get_answer_by_id_impl(id).await
    }

    async fn list_answers_by_submission(&self, submission_id: i64) -> Result<Vec<Answer>> {
        self.list_answers_by_submission_impl(submission_id).await
    }

    async fn find_answer(&self, submission_id: i64, question_id: i64) -> Result<Option<Answer>> {
        self.find_answer_impl(submission_id, question_id).await
    }

    async fn upsert_answer(&self, write: AnswerWrite, grading: GradingUpdate) -> Result<Answer> {
        self.upsert_answer_impl(write, grading).await
    }

    async fn update_answer(&self, answer: &Answer) -> Result<Answer> {
        self.update_answer_impl(answer).await
    }
}

#[async_trait]
impl ExamCatalog for SeaOrmStorage {
    async fn get_exam(&self, exam_id: i64) -> Result<Option<ExamDefinition>> {
        self.get_exam_impl(exam_id).await
    }

    async fn get_question(&self, question_id: i64) -> Result<Option<QuestionDefinition>> {
        self.get_question_impl(question_id).await
    }

    async fn list_exam_ids_managed_by(&self, teacher_id: Option<i64>) -> Result<Vec<i64>> {
        self.list_exam_ids_managed_by_impl(teacher_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answers::entities::AnswerWrite;
    use rust_decimal::Decimal;
    use serde_json::json;

    async fn sqlite_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmStorage::from_connection(db)
    }

    fn new_submission(student_id: i64, exam_id: i64) -> NewSubmission {
        NewSubmission {
            exam_id,
            student_id,
            attempt_number: 1,
            started_at: chrono::Utc::now(),
            question_seed: Some(11),
            option_seed: None,
            max_score: Decimal::from(10),
        }
    }

    async fn seed_exam(storage: &SeaOrmStorage, exam_id: i64) {
        use crate::entity::exams::ActiveModel;
        use sea_orm::{ActiveModelTrait, Set};
        ActiveModel {
            id: Set(exam_id),
            title: Set("Quiz".into()),
            description: Set(None),
            subject_class_id: Set(None),
            class_teacher_id: Set(Some(8)),
            created_by: Set(7),
            start_time: Set(None),
            end_time: Set(None),
            duration_minutes: Set(30),
            total_score: Set(10.0),
            passing_score: Set(Some(6.0)),
            randomize_questions: Set(false),
            randomize_options: Set(false),
            show_score_only: Set(false),
            show_correct_answers: Set(true),
            allow_review_after_submit: Set(true),
            show_results_after_submit: Set(true),
            max_attempts: Set(2),
            is_published: Set(true),
            created_at: Set(0),
            updated_at: Set(0),
        }
        .insert(&storage.db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_active_lock_enforced_by_database() {
        let storage = sqlite_storage().await;
        seed_exam(&storage, 1).await;

        let mut first = storage.create_submission(new_submission(3, 1)).await.unwrap();
        let err = storage
            .create_submission(new_submission(3, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E008");

        first.status = SubmissionStatus::Submitted;
        storage.update_submission(&first).await.unwrap();
        assert!(storage.find_active_submission(3, 1).await.unwrap().is_none());
        assert!(storage.create_submission(new_submission(3, 1)).await.is_ok());
        assert_eq!(
            storage
                .list_submissions_by_student_and_exam(3, 1)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_catalog_and_answer_roundtrip() {
        let storage = sqlite_storage().await;
        seed_exam(&storage, 1).await;

        let exam = storage.get_exam(1).await.unwrap().unwrap();
        assert_eq!(exam.passing_score, Some(Decimal::from(6)));
        assert_eq!(storage.list_exam_ids_managed_by(Some(8)).await.unwrap(), vec![1]);
        assert!(storage.list_exam_ids_managed_by(Some(9)).await.unwrap().is_empty());

        let submission = storage.create_submission(new_submission(3, 1)).await.unwrap();
        {
            use crate::entity::questions::ActiveModel;
            use sea_orm::{ActiveModelTrait, Set};
            ActiveModel {
                id: Set(5),
                question_type: Set("SINGLE_CHOICE".into()),
                question_text: Set("Pick one".into()),
                options: Set(Some(r#"{"A":"x","B":"y"}"#.into())),
                correct_answer: Set(Some("B".into())),
                created_at: Set(0),
                updated_at: Set(0),
            }
            .insert(&storage.db)
            .await
            .unwrap();
        }

        let write = |value: &str| AnswerWrite {
            submission_id: submission.id,
            question_id: 5,
            answer_json: Some(json!(value)),
            answer_text: None,
            uploaded_file_url: None,
            uploaded_file_name: None,
            saved_at: chrono::Utc::now(),
        };
        storage
            .upsert_answer(write("A"), GradingUpdate::Keep)
            .await
            .unwrap();
        let answer = storage
            .upsert_answer(
                write("B"),
                GradingUpdate::Set {
                    is_correct: true,
                    points_earned: Decimal::from(2),
                    max_points: Decimal::from(2),
                },
            )
            .await
            .unwrap();
        assert_eq!(answer.saved_count, 2);
        assert_eq!(answer.answer_json, Some(json!("B")));
        assert_eq!(answer.points_earned, Some(Decimal::from(2)));
        assert_eq!(
            storage
                .list_answers_by_submission(submission.id)
                .await
                .unwrap()
                .len(),
            1
        );

        storage
            .touch_submission(submission.id, chrono::Utc::now())
            .await
            .unwrap();
        let stored = storage
            .get_submission_by_id(submission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.auto_save_count, 1);
        assert_eq!(stored.question_seed, Some(11));
    }
}
