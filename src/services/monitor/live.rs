//! 实时监考
//!
//! 每次调用都从存储重新计算，没有需要失效的缓存状态。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

use super::MonitorService;
use crate::config::MonitorPolicy;
use crate::errors::Result;
use crate::models::actors::Actor;
use crate::models::exams::entities::ExamDefinition;
use crate::models::monitor::responses::{
    ActiveSessionItem, LiveAlert, LiveAlertKind, LiveExamSnapshot, LiveSessionView, LiveStats,
};
use crate::models::submissions::entities::{Submission, SubmissionStatus};
use crate::services::access::{ensure_can_manage, load_exam, managed_exam_ids};
use crate::utils::decimal::{percentage, round2};

pub async fn snapshot(
    service: &MonitorService,
    exam_id: i64,
    actor: &Actor,
) -> Result<LiveExamSnapshot> {
    let exam = load_exam(service.ctx.catalog.as_ref(), exam_id).await?;
    ensure_can_manage(&exam, actor)?;

    let storage = service.ctx.storage.as_ref();
    let submissions = storage
        .list_submissions_by_exams(&[exam_id], &[SubmissionStatus::InProgress])
        .await?;
    let now = service.ctx.clock.now();

    let mut sessions = Vec::with_capacity(submissions.len());
    for submission in &submissions {
        let answered = storage
            .list_answers_by_submission(submission.id)
            .await?
            .iter()
            .filter(|a| a.has_content())
            .count();
        sessions.push(session_view(
            submission,
            &exam,
            answered,
            now,
            &service.monitor,
        ));
    }

    Ok(LiveExamSnapshot {
        exam_id,
        exam_title: exam.title.clone(),
        duration_minutes: exam.duration_minutes,
        generated_at: now,
        stats: build_stats(&sessions, &service.monitor),
        alerts: build_alerts(&sessions, &service.monitor),
        sessions,
    })
}

pub async fn active_sessions(
    service: &MonitorService,
    actor: &Actor,
) -> Result<Vec<ActiveSessionItem>> {
    let catalog = service.ctx.catalog.as_ref();
    let exam_ids = managed_exam_ids(catalog, actor).await?;
    let mut submissions = service
        .ctx
        .storage
        .list_submissions_by_exams(&exam_ids, &[SubmissionStatus::InProgress])
        .await?;
    submissions.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let now = service.ctx.clock.now();
    let mut exams: HashMap<i64, ExamDefinition> = HashMap::new();
    let mut items = Vec::with_capacity(submissions.len());
    for submission in submissions {
        if !exams.contains_key(&submission.exam_id) {
            match catalog.get_exam(submission.exam_id).await? {
                Some(exam) => {
                    exams.insert(exam.id, exam);
                }
                None => {
                    warn!(
                        "Active submission {} references missing exam {}",
                        submission.id, submission.exam_id
                    );
                    continue;
                }
            }
        }
        let Some(exam) = exams.get(&submission.exam_id) else {
            continue;
        };
        items.push(ActiveSessionItem {
            submission_id: submission.id,
            exam_id: exam.id,
            exam_title: exam.title.clone(),
            student_id: submission.student_id,
            attempt_number: submission.attempt_number,
            started_at: submission.started_at,
            last_activity_at: submission.last_activity_at(),
            remaining_seconds: submission.remaining_seconds(exam.duration_minutes, now),
        });
    }
    Ok(items)
}

/// 单个答卷的实时状态
pub fn session_view(
    submission: &Submission,
    exam: &ExamDefinition,
    answered_questions: usize,
    now: DateTime<Utc>,
    policy: &MonitorPolicy,
) -> LiveSessionView {
    let total_questions = exam.questions.len();
    let effective_duration =
        i64::from(exam.duration_minutes) + i64::from(submission.extra_minutes);
    let elapsed_minutes = (now - submission.started_at).num_minutes().max(0);
    let last_activity_at = submission.last_activity_at();
    let idle = now - last_activity_at;

    LiveSessionView {
        submission_id: submission.id,
        student_id: submission.student_id,
        attempt_number: submission.attempt_number,
        started_at: submission.started_at,
        last_activity_at,
        answered_questions,
        total_questions,
        progress_percent: percentage(
            Decimal::from(answered_questions as u64),
            Decimal::from(total_questions as u64),
        )
        .unwrap_or_default(),
        elapsed_minutes,
        effective_duration_minutes: effective_duration,
        remaining_minutes: (effective_duration - elapsed_minutes).max(0),
        minutes_since_activity: idle.num_minutes().max(0),
        inactive: idle.num_seconds() > policy.inactivity_minutes * 60,
    }
}

pub fn build_stats(sessions: &[LiveSessionView], policy: &MonitorPolicy) -> LiveStats {
    let low_progress = Decimal::from(policy.low_progress_percent);
    let count = sessions.len();
    let average = |sum: Decimal| {
        if count == 0 {
            Decimal::ZERO
        } else {
            round2(sum / Decimal::from(count as u64))
        }
    };

    LiveStats {
        active_count: count,
        average_progress: average(sessions.iter().map(|s| s.progress_percent).sum()),
        average_remaining_minutes: average(
            sessions
                .iter()
                .map(|s| Decimal::from(s.remaining_minutes))
                .sum(),
        ),
        low_progress_count: sessions
            .iter()
            .filter(|s| s.progress_percent < low_progress)
            .count(),
        inactive_count: sessions.iter().filter(|s| s.inactive).count(),
    }
}

/// 三条独立规则，只有命中时才生成对应告警
pub fn build_alerts(sessions: &[LiveSessionView], policy: &MonitorPolicy) -> Vec<LiveAlert> {
    let struggling_progress = Decimal::from(policy.struggling_progress_percent);
    let collect = |pred: &dyn Fn(&LiveSessionView) -> bool| -> Vec<i64> {
        sessions
            .iter()
            .filter(|s| pred(s))
            .map(|s| s.submission_id)
            .collect()
    };

    let inactive = collect(&|s| s.inactive);
    let running_out = collect(&|s| s.remaining_minutes < policy.urgent_remaining_minutes);
    let struggling = collect(&|s| {
        s.progress_percent < struggling_progress
            && s.remaining_minutes * 2 < s.effective_duration_minutes
    });

    let mut alerts = Vec::new();
    if !inactive.is_empty() {
        alerts.push(LiveAlert {
            kind: LiveAlertKind::Inactive,
            message: format!(
                "{} student(s) inactive for more than {} minutes",
                inactive.len(),
                policy.inactivity_minutes
            ),
            submission_ids: inactive,
        });
    }
    if !running_out.is_empty() {
        alerts.push(LiveAlert {
            kind: LiveAlertKind::TimeRunningOut,
            message: format!(
                "{} student(s) have less than {} minutes remaining",
                running_out.len(),
                policy.urgent_remaining_minutes
            ),
            submission_ids: running_out,
        });
    }
    if !struggling.is_empty() {
        alerts.push(LiveAlert {
            kind: LiveAlertKind::Struggling,
            message: format!(
                "{} student(s) below {}% progress with less than half the time remaining",
                struggling.len(),
                policy.struggling_progress_percent
            ),
            submission_ids: struggling,
        });
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures;
    use chrono::Duration;
    use std::str::FromStr;

    fn exam_with_questions(n: i64) -> ExamDefinition {
        let refs = (1..=n)
            .map(|id| fixtures::qref(id, id as i32, 10))
            .collect();
        fixtures::exam(1, refs)
    }

    fn running(id: i64, started_minutes_ago: i64, idle_minutes: i64) -> Submission {
        let now = fixtures::t0();
        let mut s = fixtures::submission(id, 1, id, SubmissionStatus::InProgress);
        s.started_at = now - Duration::minutes(started_minutes_ago);
        s.last_saved_at = Some(now - Duration::minutes(idle_minutes));
        s
    }

    #[test]
    fn test_session_view_metrics() {
        let exam = exam_with_questions(3);
        let policy = MonitorPolicy::default();
        let view = session_view(&running(1, 20, 11), &exam, 1, fixtures::t0(), &policy);
        assert_eq!(view.progress_percent, Decimal::from_str("33.33").unwrap());
        assert_eq!(view.elapsed_minutes, 20);
        assert_eq!(view.remaining_minutes, 40);
        assert!(view.inactive);

        let active = session_view(&running(2, 20, 10), &exam, 3, fixtures::t0(), &policy);
        assert!(!active.inactive);
        assert_eq!(active.progress_percent, Decimal::from(100));
    }

    #[test]
    fn test_remaining_includes_extension_and_floors_at_zero() {
        let exam = exam_with_questions(2);
        let policy = MonitorPolicy::default();
        let mut extended = running(1, 70, 0);
        extended.extra_minutes = 15;
        let view = session_view(&extended, &exam, 0, fixtures::t0(), &policy);
        assert_eq!(view.remaining_minutes, 5);

        let overdue = session_view(&running(2, 90, 0), &exam, 0, fixtures::t0(), &policy);
        assert_eq!(overdue.remaining_minutes, 0);
    }

    #[test]
    fn test_stats_and_alerts() {
        let exam = exam_with_questions(10);
        let policy = MonitorPolicy::default();
        let now = fixtures::t0();
        let sessions = vec![
            // 进度 10%，剩余 2 分钟，闲置 12 分钟
            session_view(&running(1, 58, 12), &exam, 1, now, &policy),
            // 进度 50%，剩余 30 分钟
            session_view(&running(2, 30, 1), &exam, 5, now, &policy),
            // 进度 10%，剩余 50 分钟：进度低但时间充裕
            session_view(&running(3, 10, 1), &exam, 1, now, &policy),
        ];

        let stats = build_stats(&sessions, &policy);
        assert_eq!(stats.active_count, 3);
        assert_eq!(stats.average_progress, Decimal::from_str("23.33").unwrap());
        assert_eq!(
            stats.average_remaining_minutes,
            Decimal::from_str("27.33").unwrap()
        );
        assert_eq!(stats.low_progress_count, 2);
        assert_eq!(stats.inactive_count, 1);

        let alerts = build_alerts(&sessions, &policy);
        let kinds: Vec<_> = alerts.iter().map(|a| (a.kind, a.submission_ids.clone())).collect();
        assert_eq!(
            kinds,
            vec![
                (LiveAlertKind::Inactive, vec![1]),
                (LiveAlertKind::TimeRunningOut, vec![1]),
                (LiveAlertKind::Struggling, vec![1]),
            ]
        );
    }

    #[test]
    fn test_empty_exam_produces_no_alerts() {
        let policy = MonitorPolicy::default();
        let stats = build_stats(&[], &policy);
        assert_eq!(stats.active_count, 0);
        assert_eq!(stats.average_progress, Decimal::ZERO);
        assert!(build_alerts(&[], &policy).is_empty());
    }
}
