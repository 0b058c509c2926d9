use rust_decimal::Decimal;

use super::{GradingService, scoring::percentage};
use crate::errors::Result;
use crate::models::actors::Actor;
use crate::models::grading::responses::{GradingStatsResponse, ScoreRange};
use crate::models::submissions::entities::{Submission, SubmissionStatus};
use crate::services::access::{ensure_can_manage, load_exam};
use crate::utils::decimal::round2;

const SCORE_BANDS: [(&str, i64); 5] = [
    ("90-100", 90),
    ("80-89", 80),
    ("70-79", 70),
    ("60-69", 60),
    ("0-59", 0),
];

pub async fn get_grading_stats(
    service: &GradingService,
    exam_id: i64,
    actor: &Actor,
) -> Result<GradingStatsResponse> {
    let exam = load_exam(service.ctx.catalog.as_ref(), exam_id).await?;
    ensure_can_manage(&exam, actor)?;

    let submissions = service
        .ctx
        .storage
        .list_submissions_by_exams(&[exam_id], SubmissionStatus::grading_visible())
        .await?;
    let (graded, awaiting): (Vec<Submission>, Vec<Submission>) = submissions
        .into_iter()
        .partition(|s| s.status == SubmissionStatus::Graded);

    Ok(compute_stats(exam_id, &graded, awaiting.len() as i64))
}

/// 只统计已完成阅卷的答卷；没有数据时返回全零
pub fn compute_stats(exam_id: i64, graded: &[Submission], awaiting: i64) -> GradingStatsResponse {
    let graded_count = graded.len() as i64;
    let distribution = score_distribution(graded);
    if graded.is_empty() {
        return GradingStatsResponse {
            exam_id,
            graded_count: 0,
            awaiting_finalization: awaiting,
            average_score: Decimal::ZERO,
            min_score: Decimal::ZERO,
            max_score: Decimal::ZERO,
            passed_count: 0,
            pass_rate: Decimal::ZERO,
            score_distribution: distribution,
        };
    }

    let total: Decimal = graded.iter().map(|s| s.total_score).sum();
    let min_score = graded
        .iter()
        .map(|s| s.total_score)
        .min()
        .unwrap_or_default();
    let max_score = graded
        .iter()
        .map(|s| s.total_score)
        .max()
        .unwrap_or_default();
    let passed_count = graded.iter().filter(|s| s.passed).count() as i64;

    GradingStatsResponse {
        exam_id,
        graded_count,
        awaiting_finalization: awaiting,
        average_score: round2(total / Decimal::from(graded_count)),
        min_score,
        max_score,
        passed_count,
        pass_rate: percentage(Decimal::from(passed_count), Decimal::from(graded_count))
            .unwrap_or_default(),
        score_distribution: distribution,
    }
}

/// 按得分率分段
fn score_distribution(graded: &[Submission]) -> Vec<ScoreRange> {
    let mut counts = [0i64; SCORE_BANDS.len()];
    for submission in graded {
        let rate = percentage(submission.total_score, submission.max_score).unwrap_or_default();
        let band = SCORE_BANDS
            .iter()
            .position(|(_, floor)| rate >= Decimal::from(*floor))
            .unwrap_or(SCORE_BANDS.len() - 1);
        counts[band] += 1;
    }

    SCORE_BANDS
        .iter()
        .zip(counts)
        .map(|((range, _), count)| ScoreRange {
            range: (*range).to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures;
    use std::str::FromStr;

    fn graded(id: i64, score: i64, passed: bool) -> Submission {
        let mut s = fixtures::submission(id, 1, id, SubmissionStatus::Graded);
        s.total_score = Decimal::from(score);
        s.passed = passed;
        s
    }

    #[test]
    fn test_zeroed_when_nothing_graded() {
        let stats = compute_stats(1, &[], 3);
        assert_eq!(stats.graded_count, 0);
        assert_eq!(stats.awaiting_finalization, 3);
        assert_eq!(stats.pass_rate, Decimal::ZERO);
        assert!(stats.score_distribution.iter().all(|r| r.count == 0));
        assert_eq!(stats.score_distribution.len(), 5);
    }

    #[test]
    fn test_aggregates_over_graded() {
        let subs = vec![graded(1, 95, true), graded(2, 50, false), graded(3, 62, true)];
        let stats = compute_stats(1, &subs, 0);
        assert_eq!(stats.graded_count, 3);
        assert_eq!(stats.average_score, Decimal::from_str("69.00").unwrap());
        assert_eq!(stats.min_score, Decimal::from(50));
        assert_eq!(stats.max_score, Decimal::from(95));
        assert_eq!(stats.passed_count, 2);
        assert_eq!(stats.pass_rate, Decimal::from_str("66.67").unwrap());

        let counts: Vec<(String, i64)> = stats
            .score_distribution
            .into_iter()
            .map(|r| (r.range, r.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("90-100".to_string(), 1),
                ("80-89".to_string(), 0),
                ("70-79".to_string(), 0),
                ("60-69".to_string(), 1),
                ("0-59".to_string(), 1),
            ]
        );
    }
}
