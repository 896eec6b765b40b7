//! Scoring engine entry points.
//!
//! A submission flows through:
//! 1. Parsing the raw values (rejecting bad input before any state is touched)
//! 2. Classification of the total and the diet component
//! 3. Gamification update
//! 4. Appending a snapshot to the bounded history
//!
//! [`apply_submission`] is the pure pipeline on an explicit record;
//! [`Tracker`] wraps it with a [`SessionStore`] and a [`NewsSource`].

use crate::classify::{classify, classify_diet};
use crate::news::{headlines, NewsSource};
use crate::state::{SessionId, SessionStore};
use crate::types::round2;
use crate::{
    gamification, export, Dashboard, FootprintInput, GameState, RawInput, Result, SessionRecord,
    Snapshot, SubmissionOutcome,
};
use chrono::{DateTime, Utc};
use std::io::Write;

/// Default number of headlines on the dashboard
pub const DEFAULT_NEWS_LIMIT: usize = 5;

/// Apply one validated submission to a session record
pub fn apply_submission(
    record: &mut SessionRecord,
    input: FootprintInput,
    now: DateTime<Utc>,
) -> SubmissionOutcome {
    let total = input.total();
    let classification = classify(total);
    let diet_report = classify_diet(input.diet);
    let new_badges = gamification::update(&mut record.game, total, now);

    record.snapshots.append(Snapshot {
        timestamp: now,
        travel: input.travel,
        electricity: input.electricity,
        diet: input.diet,
        shopping: input.shopping,
        total,
        level: classification.level,
    });
    record.last_inputs = Some(input);

    tracing::info!(
        "Recorded submission: total {} ({}), score {}",
        total,
        classification.level,
        classification.score
    );

    SubmissionOutcome {
        input,
        total,
        level: classification.level,
        score: classification.score,
        message: classification.message,
        diet_report,
        game: record.game.clone(),
        new_badges,
    }
}

/// Build the dashboard view of a record
pub fn build_dashboard(
    record: &SessionRecord,
    news: &dyn NewsSource,
    news_limit: usize,
) -> Dashboard {
    Dashboard {
        labels: record.snapshots.labels(),
        totals: record.snapshots.totals(),
        latest: record.snapshots.latest().cloned(),
        average: round2(record.snapshots.average()),
        game: record.game.clone(),
        news: headlines(news, news_limit),
    }
}

/// Engine bound to a session store and a headline source
pub struct Tracker<S: SessionStore> {
    store: S,
    news: Box<dyn NewsSource>,
    news_limit: usize,
}

impl<S: SessionStore> Tracker<S> {
    pub fn new(store: S, news: Box<dyn NewsSource>) -> Self {
        Self {
            store,
            news,
            news_limit: DEFAULT_NEWS_LIMIT,
        }
    }

    /// Override how many headlines the dashboard requests
    pub fn with_news_limit(mut self, limit: usize) -> Self {
        self.news_limit = limit;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a submission made now
    pub fn submit(&self, session: &SessionId, raw: &RawInput) -> Result<SubmissionOutcome> {
        self.submit_at(session, raw, Utc::now())
    }

    /// Record a submission with an explicit clock
    pub fn submit_at(
        &self,
        session: &SessionId,
        raw: &RawInput,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome> {
        let input = match FootprintInput::try_from(raw) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Rejected submission for session {}: {}", session, e);
                return Err(e);
            }
        };

        self.store
            .update(session, |record| Ok(apply_submission(record, input, now)))
    }

    pub fn get_dashboard(&self, session: &SessionId) -> Result<Dashboard> {
        let record = self.store.load(session)?;
        Ok(build_dashboard(&record, self.news.as_ref(), self.news_limit))
    }

    pub fn get_history(&self, session: &SessionId) -> Result<Vec<Snapshot>> {
        Ok(self.store.load(session)?.snapshots.to_vec())
    }

    pub fn get_leaderboard(&self, session: &SessionId) -> Result<GameState> {
        Ok(self.store.load(session)?.game)
    }

    /// Inputs of the most recent submission, for pre-filling a form
    pub fn last_inputs(&self, session: &SessionId) -> Result<Option<FootprintInput>> {
        Ok(self.store.load(session)?.last_inputs)
    }

    pub fn export_json(&self, session: &SessionId) -> Result<String> {
        export::to_json(&self.store.load(session)?.snapshots)
    }

    pub fn export_csv<W: Write>(&self, session: &SessionId, writer: W) -> Result<usize> {
        export::to_csv(&self.store.load(session)?.snapshots, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::StaticNewsSource;
    use crate::state::{FileSessionStore, MemorySessionStore};
    use crate::{Badge, Error, Level, NewsItem};
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 18, 0, 0).unwrap() + Duration::days(n)
    }

    fn raw(t: &str, e: &str, d: &str, s: &str) -> RawInput {
        RawInput::from_strs(Some(t), Some(e), Some(d), Some(s))
    }

    fn tracker() -> Tracker<MemorySessionStore> {
        crate::logging::init_test();
        Tracker::new(
            MemorySessionStore::new(),
            Box::new(StaticNewsSource::new(vec![NewsItem::new("Test headline", "Unit")])),
        )
    }

    fn sid() -> SessionId {
        SessionId::parse("test").unwrap()
    }

    #[test]
    fn test_apply_submission_pipeline() {
        let mut record = SessionRecord::default();
        let input = FootprintInput {
            travel: 1.5,
            electricity: 1.0,
            diet: 0.5,
            shopping: 1.0,
        };

        let outcome = apply_submission(&mut record, input, day(0));

        assert_eq!(outcome.total, 4.0);
        assert_eq!(outcome.level, Level::Low);
        assert_eq!(outcome.score, 80);
        assert_eq!(outcome.diet_report.category, Level::Low);
        assert_eq!(outcome.game.points, 30);
        assert_eq!(outcome.new_badges, vec![Badge::LowImpactDay]);

        assert_eq!(record.snapshots.len(), 1);
        let snap = record.snapshots.latest().unwrap();
        assert_eq!(snap.timestamp, day(0));
        assert_eq!(snap.level, Level::Low);
        assert_eq!(record.last_inputs, Some(input));
    }

    #[test]
    fn test_submit_updates_store() {
        let tracker = tracker();
        let outcome = tracker
            .submit_at(&sid(), &raw("4", "3", "2", "1"), day(0))
            .unwrap();
        assert_eq!(outcome.total, 10.0);
        assert_eq!(outcome.level, Level::Moderate);
        assert_eq!(outcome.score, 65);

        let history = tracker.get_history(&sid()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(tracker.get_leaderboard(&sid()).unwrap().points, 15);
    }

    #[test]
    fn test_invalid_submission_mutates_nothing() {
        let tracker = tracker();
        tracker
            .submit_at(&sid(), &raw("1", "1", "1", "1"), day(0))
            .unwrap();

        let err = tracker
            .submit_at(&sid(), &raw("1", "abc", "1", "1"), day(1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        assert_eq!(tracker.get_history(&sid()).unwrap().len(), 1);
        let game = tracker.get_leaderboard(&sid()).unwrap();
        assert_eq!(game.points, 30);
        assert_eq!(game.last_date, Some(day(0)));
    }

    #[test]
    fn test_overflowing_total_keeps_stored_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tracker = Tracker::new(
            FileSessionStore::in_data_dir(temp_dir.path()),
            Box::new(StaticNewsSource::sample()),
        );
        for n in 0..3 {
            tracker
                .submit_at(&sid(), &raw("1", "0", "0", "0"), day(n))
                .unwrap();
        }
        let path = temp_dir.path().join("sessions/test.json");
        let before = std::fs::read_to_string(&path).unwrap();

        let err = tracker
            .submit_at(&sid(), &raw("1e307", "0", "0", "0"), day(3))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "total", .. }));
        assert!(tracker
            .submit_at(&sid(), &raw("1e308", "1e308", "1e308", "1e308"), day(3))
            .is_err());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        let game = tracker.get_leaderboard(&sid()).unwrap();
        assert_eq!(game.points, 90);
        assert_eq!(tracker.get_history(&sid()).unwrap().len(), 3);
    }

    #[test]
    fn test_dashboard_aggregates() {
        let tracker = tracker();
        tracker
            .submit_at(&sid(), &raw("10", "0", "0", "0"), day(0))
            .unwrap();
        tracker
            .submit_at(&sid(), &raw("10", "5", "3", "2"), day(1))
            .unwrap();

        let dashboard = tracker.get_dashboard(&sid()).unwrap();
        assert_eq!(dashboard.totals, vec![10.0, 20.0]);
        assert_eq!(dashboard.average, 15.0);
        assert_eq!(dashboard.labels, vec!["2024-04-01 18:00", "2024-04-02 18:00"]);
        assert_eq!(dashboard.latest.unwrap().total, 20.0);
        assert_eq!(dashboard.game.streak, 2);
        assert_eq!(dashboard.news[0].title, "Test headline");
    }

    #[test]
    fn test_dashboard_empty_session() {
        let tracker = tracker();
        let dashboard = tracker.get_dashboard(&sid()).unwrap();
        assert!(dashboard.totals.is_empty());
        assert!(dashboard.latest.is_none());
        assert_eq!(dashboard.average, 0.0);
        assert_eq!(dashboard.game, GameState::default());
    }

    #[test]
    fn test_dashboard_average_is_rounded() {
        let tracker = tracker();
        for (n, value) in ["1", "1", "2"].into_iter().enumerate() {
            tracker
                .submit_at(&sid(), &raw(value, "0", "0", "0"), day(n as i64))
                .unwrap();
        }
        assert_eq!(tracker.get_dashboard(&sid()).unwrap().average, 1.33);
    }

    #[test]
    fn test_history_capped_through_engine() {
        let tracker = tracker();
        for n in 0..35 {
            tracker
                .submit_at(&sid(), &raw(&n.to_string(), "0", "0", "0"), day(n))
                .unwrap();
        }
        let history = tracker.get_history(&sid()).unwrap();
        assert_eq!(history.len(), 30);
        assert_eq!(history[0].total, 5.0);
        assert_eq!(history[29].total, 34.0);
    }

    #[test]
    fn test_last_inputs_and_export() {
        let tracker = tracker();
        assert!(tracker.last_inputs(&sid()).unwrap().is_none());

        tracker
            .submit_at(&sid(), &RawInput::from_strs(Some("2"), None, Some("1"), None), day(0))
            .unwrap();

        let last = tracker.last_inputs(&sid()).unwrap().unwrap();
        assert_eq!(last.travel, 2.0);
        assert_eq!(last.electricity, 0.0);

        let exported: Vec<Snapshot> =
            serde_json::from_str(&tracker.export_json(&sid()).unwrap()).unwrap();
        assert_eq!(exported, tracker.get_history(&sid()).unwrap());

        let mut csv_out = Vec::new();
        assert_eq!(tracker.export_csv(&sid(), &mut csv_out).unwrap(), 1);
    }

    #[test]
    fn test_file_backed_tracker_persists_between_instances() {
        let temp_dir = tempfile::tempdir().unwrap();
        let make = || {
            Tracker::new(
                FileSessionStore::in_data_dir(temp_dir.path()),
                Box::new(StaticNewsSource::sample()),
            )
        };

        make()
            .submit_at(&sid(), &raw("1", "1", "1", "1"), day(0))
            .unwrap();
        make()
            .submit_at(&sid(), &raw("1", "1", "1", "1"), day(1))
            .unwrap();

        let game = make().get_leaderboard(&sid()).unwrap();
        assert_eq!(game.points, 60);
        assert_eq!(game.streak, 2);
        assert!(temp_dir.path().join("sessions/test.json").exists());
    }
}
