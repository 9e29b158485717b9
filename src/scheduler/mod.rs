//! Spaced-repetition scheduling.
//!
//! A fixed ascending table of review intervals is indexed by the article's
//! stage; beyond the table, reviews repeat every 30 days instead of growing
//! unbounded. Articles created more than a year ago are deferred by ten
//! years on any update without advancing the stage, so ancient content
//! stops resurfacing while the touch is still recorded.

use chrono::{DateTime, Duration, Utc};

use crate::article::Article;

/// Review intervals in days, indexed by stage.
pub const REVIEW_INTERVALS_DAYS: [i64; 10] = [1, 3, 5, 7, 14, 30, 60, 90, 120, 150];

/// Interval applied to stages past the end of the table.
const OVERFLOW_INTERVAL_DAYS: i64 = 30;

/// Post-table reviews granted before an article counts as mastered.
const MASTERY_GRACE_REVIEWS: u32 = 12;

/// Articles older than this get the dormancy deferral instead of a
/// normal reschedule.
const DORMANCY_AGE_DAYS: i64 = 365;

/// How far a dormant article is pushed out.
const DORMANCY_DEFERRAL_DAYS: i64 = 3650;

/// The outcome of one scheduling decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPlan {
    /// When the article is next due. Never earlier than `now`.
    pub next_review: DateTime<Utc>,

    /// The stage after this review completes.
    pub next_stage: u32,

    /// Advisory mastered flag. Scheduling continues past it; callers may
    /// surface a badge.
    pub finished: bool,
}

/// Map the current stage to the next review date and stage.
///
/// Pure and idempotent for a fixed `(stage, now)`.
pub fn compute_next_review(stage: u32, now: DateTime<Utc>) -> ReviewPlan {
    let days_to_add = REVIEW_INTERVALS_DAYS
        .get(stage as usize)
        .copied()
        .unwrap_or(OVERFLOW_INTERVAL_DAYS);

    ReviewPlan {
        next_review: now + Duration::days(days_to_add),
        next_stage: stage + 1,
        finished: stage >= REVIEW_INTERVALS_DAYS.len() as u32 + MASTERY_GRACE_REVIEWS,
    }
}

/// Whether an article has aged past the dormancy threshold.
pub fn is_dormant(article: &Article, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(article.created_at) > Duration::days(DORMANCY_AGE_DAYS)
}

/// Apply a completed review pass to an article.
///
/// Dormant articles are deferred ten years with an unchanged stage; the
/// touch is still recorded in `last_practiced`. Everything else advances
/// through the interval table.
pub fn apply_completion(article: &mut Article, now: DateTime<Utc>) {
    if is_dormant(article, now) {
        article.next_review = now + Duration::days(DORMANCY_DEFERRAL_DAYS);
        article.last_practiced = Some(now);
        return;
    }

    let plan = compute_next_review(article.stage, now);
    article.stage = plan.next_stage;
    article.next_review = plan.next_review;
    article.last_practiced = Some(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Segment;

    fn sample_segments() -> Vec<Segment> {
        vec![Segment {
            id: 0,
            text: "hello there".into(),
            translation: None,
            start: 0.0,
            end: 2.0,
        }]
    }

    #[test]
    fn first_review_is_one_day_out() {
        let now = Utc::now();
        let plan = compute_next_review(0, now);
        assert_eq!(plan.next_stage, 1);
        assert_eq!(plan.next_review, now + Duration::days(1));
        assert!(!plan.finished);
    }

    #[test]
    fn chained_stages_reproduce_the_interval_table() {
        let now = Utc::now();
        let mut stage = 0;
        for expected_days in REVIEW_INTERVALS_DAYS {
            let plan = compute_next_review(stage, now);
            assert_eq!(plan.next_review, now + Duration::days(expected_days));
            stage = plan.next_stage;
        }
        // Beyond the table: stable 30-day increments.
        for _ in 0..5 {
            let plan = compute_next_review(stage, now);
            assert_eq!(plan.next_review, now + Duration::days(30));
            stage = plan.next_stage;
        }
    }

    #[test]
    fn finished_flips_exactly_at_table_length_plus_grace() {
        let now = Utc::now();
        let threshold = REVIEW_INTERVALS_DAYS.len() as u32 + 12;
        assert!(!compute_next_review(threshold - 1, now).finished);
        assert!(compute_next_review(threshold, now).finished);
        assert!(compute_next_review(threshold + 1, now).finished);
    }

    #[test]
    fn next_review_never_precedes_now() {
        let now = Utc::now();
        for stage in 0..40 {
            assert!(compute_next_review(stage, now).next_review >= now);
        }
    }

    #[test]
    fn dormant_article_is_deferred_without_stage_change() {
        let now = Utc::now();
        let mut article = Article::new("old", sample_segments(), "audio/mpeg");
        article.created_at = now - Duration::days(400);
        article.stage = 3;

        apply_completion(&mut article, now);

        assert_eq!(article.stage, 3);
        assert_eq!(article.next_review, now + Duration::days(3650));
        assert_eq!(article.last_practiced, Some(now));
    }

    #[test]
    fn fresh_article_advances_normally() {
        let now = Utc::now();
        let mut article = Article::new("new", sample_segments(), "audio/mpeg");
        article.created_at = now - Duration::days(10);

        apply_completion(&mut article, now);

        assert_eq!(article.stage, 1);
        assert_eq!(article.next_review, now + Duration::days(1));
    }
}
