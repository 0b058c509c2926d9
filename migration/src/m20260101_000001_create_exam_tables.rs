use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建考试表
        manager
            .create_table(
                Table::create()
                    .table(Exams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Exams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Exams::Title).string().not_null())
                    .col(ColumnDef::new(Exams::Description).text().null())
                    .col(ColumnDef::new(Exams::SubjectClassId).big_integer().null())
                    .col(ColumnDef::new(Exams::ClassTeacherId).big_integer().null())
                    .col(ColumnDef::new(Exams::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Exams::StartTime).big_integer().null())
                    .col(ColumnDef::new(Exams::EndTime).big_integer().null())
                    .col(
                        ColumnDef::new(Exams::DurationMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Exams::TotalScore).double().not_null())
                    .col(ColumnDef::new(Exams::PassingScore).double().null())
                    .col(
                        ColumnDef::new(Exams::RandomizeQuestions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::RandomizeOptions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::ShowScoreOnly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::ShowCorrectAnswers)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Exams::AllowReviewAfterSubmit)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Exams::ShowResultsAfterSubmit)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Exams::MaxAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Exams::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Exams::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Exams::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建题库表
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Questions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Questions::QuestionType).string().not_null())
                    .col(ColumnDef::new(Questions::QuestionText).text().not_null())
                    .col(ColumnDef::new(Questions::Options).text().null())
                    .col(ColumnDef::new(Questions::CorrectAnswer).text().null())
                    .col(
                        ColumnDef::new(Questions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Questions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考试题目关联表
        manager
            .create_table(
                Table::create()
                    .table(ExamQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamQuestions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExamQuestions::ExamId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ExamQuestions::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamQuestions::QuestionOrder)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExamQuestions::Points).double().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamQuestions::Table, ExamQuestions::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamQuestions::Table, ExamQuestions::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建答卷表
        manager
            .create_table(
                Table::create()
                    .table(ExamSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExamSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::ExamId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::AttemptNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExamSubmissions::Status).string().not_null())
                    .col(
                        ColumnDef::new(ExamSubmissions::StartedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::SubmittedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::LastSavedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::AutoSaveCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::QuestionSeed)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::OptionSeed)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::TotalScore)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::MaxScore)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::Passed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::TimeSpentSeconds)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::ExtraMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::AutoSubmitted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // 进行中/暂停时为 "student:exam"，提交后置空，唯一索引保证同一时刻只有一份活动答卷
                    .col(
                        ColumnDef::new(ExamSubmissions::ActiveLock)
                            .string()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExamSubmissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ExamSubmissions::Table, ExamSubmissions::ExamId)
                            .to(Exams::Table, Exams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作答表
        manager
            .create_table(
                Table::create()
                    .table(StudentAnswers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentAnswers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::QuestionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudentAnswers::AnswerJson).text().null())
                    .col(ColumnDef::new(StudentAnswers::AnswerText).text().null())
                    .col(
                        ColumnDef::new(StudentAnswers::UploadedFileUrl)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::UploadedFileName)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(StudentAnswers::IsCorrect).boolean().null())
                    .col(ColumnDef::new(StudentAnswers::PointsEarned).double().null())
                    .col(ColumnDef::new(StudentAnswers::MaxPoints).double().null())
                    .col(ColumnDef::new(StudentAnswers::TeacherFeedback).text().null())
                    .col(ColumnDef::new(StudentAnswers::GradedBy).big_integer().null())
                    .col(ColumnDef::new(StudentAnswers::GradedAt).big_integer().null())
                    .col(
                        ColumnDef::new(StudentAnswers::SavedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::FirstSavedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentAnswers::LastSavedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentAnswers::Table, StudentAnswers::SubmissionId)
                            .to(ExamSubmissions::Table, ExamSubmissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentAnswers::Table, StudentAnswers::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_questions_exam_question")
                    .table(ExamQuestions::Table)
                    .col(ExamQuestions::ExamId)
                    .col(ExamQuestions::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_submissions_student_exam")
                    .table(ExamSubmissions::Table)
                    .col(ExamSubmissions::StudentId)
                    .col(ExamSubmissions::ExamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_submissions_exam_status")
                    .table(ExamSubmissions::Table)
                    .col(ExamSubmissions::ExamId)
                    .col(ExamSubmissions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_exam_submissions_status")
                    .table(ExamSubmissions::Table)
                    .col(ExamSubmissions::Status)
                    .to_owned(),
            )
            .await?;

        // 每份答卷每道题至多一条作答记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_answers_submission_question")
                    .table(StudentAnswers::Table)
                    .col(StudentAnswers::SubmissionId)
                    .col(StudentAnswers::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(StudentAnswers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExamQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exams::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Exams {
    #[sea_orm(iden = "exams")]
    Table,
    Id,
    Title,
    Description,
    SubjectClassId,
    ClassTeacherId,
    CreatedBy,
    StartTime,
    EndTime,
    DurationMinutes,
    TotalScore,
    PassingScore,
    RandomizeQuestions,
    RandomizeOptions,
    ShowScoreOnly,
    ShowCorrectAnswers,
    AllowReviewAfterSubmit,
    ShowResultsAfterSubmit,
    MaxAttempts,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Questions {
    #[sea_orm(iden = "questions")]
    Table,
    Id,
    QuestionType,
    QuestionText,
    Options,
    CorrectAnswer,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExamQuestions {
    #[sea_orm(iden = "exam_questions")]
    Table,
    Id,
    ExamId,
    QuestionId,
    QuestionOrder,
    Points,
}

#[derive(DeriveIden)]
enum ExamSubmissions {
    #[sea_orm(iden = "exam_submissions")]
    Table,
    Id,
    ExamId,
    StudentId,
    AttemptNumber,
    Status,
    StartedAt,
    SubmittedAt,
    LastSavedAt,
    AutoSaveCount,
    QuestionSeed,
    OptionSeed,
    TotalScore,
    MaxScore,
    Passed,
    TimeSpentSeconds,
    ExtraMinutes,
    AutoSubmitted,
    ActiveLock,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentAnswers {
    #[sea_orm(iden = "student_answers")]
    Table,
    Id,
    SubmissionId,
    QuestionId,
    AnswerJson,
    AnswerText,
    UploadedFileUrl,
    UploadedFileName,
    IsCorrect,
    PointsEarned,
    MaxPoints,
    TeacherFeedback,
    GradedBy,
    GradedAt,
    SavedCount,
    FirstSavedAt,
    LastSavedAt,
}
