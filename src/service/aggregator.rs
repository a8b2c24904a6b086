use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use crate::model::{
    ids::MatchId,
    kda::{ParticipantRecord, PlayerAggregate},
};

use super::data_manager::DataRetrievalError;

const DEFAULT_WORKERS: usize = 4;
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const RATE_LIMIT_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;
const BACKOFF_SLICE: Duration = Duration::from_millis(200);

/// Source of per-match participant records the aggregator fans out over.
pub trait MatchSource {
    fn match_participants(&self, id: &MatchId) -> Result<Vec<ParticipantRecord>, DataRetrievalError>;
}

/// Cooperative cancellation flag shared between the caller and the fetch
/// workers. Cancelling abandons queued fetches; results already received are
/// still surfaced.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A match that could not be aggregated, with the reason it was skipped.
#[derive(Debug)]
pub struct SkippedMatch {
    pub match_id: MatchId,
    pub reason: DataRetrievalError,
}

/// Result of one aggregation run. `fetched + skipped.len()` can fall short
/// of `total` only when the run was cancelled.
pub struct AggregateOutcome {
    pub players: HashMap<String, PlayerAggregate>,
    pub fetched: usize,
    pub skipped: Vec<SkippedMatch>,
    pub total: usize,
    pub cancelled: bool,
}

/// Fans match-detail fetches out over a bounded worker pool and folds the
/// per-match participant records into per-player running totals. Workers only
/// fetch; all accumulation happens on the calling thread, so per-player
/// updates are never concurrent.
pub struct Aggregator<S> {
    source: Arc<S>,
    workers: usize,
}

impl<S: MatchSource + Send + Sync + 'static> Aggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn aggregate(&self, match_ids: Vec<MatchId>, cancel: &CancelToken) -> AggregateOutcome {
        let total = match_ids.len();

        let (job_tx, job_rx) = mpsc::channel();
        for id in match_ids {
            let _ = job_tx.send(id);
        }
        drop(job_tx);
        let jobs = Arc::new(Mutex::new(job_rx));

        let (result_tx, result_rx) = mpsc::channel();
        let workers = self.workers.min(total.max(1));
        let mut handles = Vec::with_capacity(workers);

        for _ in 0..workers {
            let source = Arc::clone(&self.source);
            let jobs = Arc::clone(&jobs);
            let results = result_tx.clone();
            let cancel = cancel.clone();

            handles.push(thread::spawn(move || loop {
                let job = {
                    let guard = match jobs.lock() {
                        Ok(guard) => guard,
                        Err(_) => return,
                    };
                    guard.recv()
                };
                let Ok(id) = job else { return };

                if cancel.is_cancelled() {
                    return;
                }

                let outcome = fetch_with_backoff(source.as_ref(), &id, &cancel);
                if results.send((id, outcome)).is_err() {
                    return;
                }
            }));
        }
        drop(result_tx);

        // Single-writer accumulation over whatever the workers deliver.
        let (players, skipped, fetched) = fold_results(result_rx);

        for handle in handles {
            let _ = handle.join();
        }

        AggregateOutcome {
            players,
            fetched,
            skipped,
            total,
            cancelled: cancel.is_cancelled(),
        }
    }
}

/// Adds one match's participant records to the running per-player totals.
pub fn accumulate(
    players: &mut HashMap<String, PlayerAggregate>,
    records: &[ParticipantRecord],
) {
    for record in records {
        players
            .entry(record.summoner_name.clone())
            .or_default()
            .record(&record.kda);
    }
}

type MatchResult = (MatchId, Result<Vec<ParticipantRecord>, DataRetrievalError>);

fn fold_results<I>(
    results: I,
) -> (HashMap<String, PlayerAggregate>, Vec<SkippedMatch>, usize)
where
    I: IntoIterator<Item = MatchResult>,
{
    let mut players = HashMap::new();
    let mut skipped = Vec::new();
    let mut fetched = 0;

    for (match_id, outcome) in results {
        match outcome {
            Ok(records) => {
                fetched += 1;
                accumulate(&mut players, &records);
            }
            Err(reason) => {
                log::warn!("Skipping match {}: {}", match_id, reason);
                skipped.push(SkippedMatch { match_id, reason });
            }
        }
    }

    (players, skipped, fetched)
}

fn fetch_with_backoff<S: MatchSource>(
    source: &S,
    id: &MatchId,
    cancel: &CancelToken,
) -> Result<Vec<ParticipantRecord>, DataRetrievalError> {
    use super::gameapi::client::RequestError;

    let mut attempt = 0;
    loop {
        match source.match_participants(id) {
            Err(DataRetrievalError::ClientFailed(RequestError::RateLimited { retry_after }))
                if attempt < MAX_RATE_LIMIT_RETRIES && !cancel.is_cancelled() =>
            {
                attempt += 1;
                let delay = backoff_delay(retry_after, attempt);
                log::warn!(
                    "Rate limited fetching match {}, retrying in {}s (attempt {})",
                    id,
                    delay.as_secs(),
                    attempt
                );
                sleep_cancellable(delay, cancel);
                if cancel.is_cancelled() {
                    return Err(DataRetrievalError::ClientFailed(RequestError::RateLimited {
                        retry_after,
                    }));
                }
            }
            other => return other,
        }
    }
}

/// Server-requested waits are honored but capped, so a bogus Retry-After
/// cannot park a worker for hours.
fn backoff_delay(retry_after: Option<u64>, attempt: u32) -> Duration {
    let secs = retry_after.unwrap_or(RATE_LIMIT_BACKOFF_SECS * u64::from(attempt));
    Duration::from_secs(secs.min(MAX_BACKOFF_SECS))
}

/// Sleeps in short slices so a cancelled run stops backing off promptly
/// instead of sitting out the full delay.
fn sleep_cancellable(delay: Duration, cancel: &CancelToken) {
    let deadline = Instant::now() + delay;
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        thread::sleep(remaining.min(BACKOFF_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;
    use crate::model::kda::Kda;
    use crate::service::gameapi::client::RequestError;
    use crate::service::gameapi::parsing::ParsingError;

    fn record(name: &str, pid: u16, kills: u32, deaths: u32, assists: u32) -> ParticipantRecord {
        ParticipantRecord {
            participant_id: pid,
            summoner_name: name.to_string(),
            kda: Kda::new(kills, deaths, assists),
        }
    }

    /// Serves canned records per match id; unknown ids fail like a malformed
    /// match.
    struct MapSource {
        matches: HashMap<MatchId, Vec<ParticipantRecord>>,
    }

    impl MatchSource for MapSource {
        fn match_participants(
            &self,
            id: &MatchId,
        ) -> Result<Vec<ParticipantRecord>, DataRetrievalError> {
            match self.matches.get(id) {
                Some(records) => Ok(records.clone()),
                None => Err(DataRetrievalError::ParsingFailed(ParsingError::IdentityMissing(1))),
            }
        }
    }

    /// Answers the first call with a rate limit, then succeeds.
    struct RateLimitedOnce {
        records: Vec<ParticipantRecord>,
        attempts: Arc<AtomicU32>,
    }

    impl MatchSource for RateLimitedOnce {
        fn match_participants(
            &self,
            _id: &MatchId,
        ) -> Result<Vec<ParticipantRecord>, DataRetrievalError> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DataRetrievalError::ClientFailed(RequestError::RateLimited {
                    retry_after: Some(0),
                }))
            } else {
                Ok(self.records.clone())
            }
        }
    }

    /// Cancels the shared token from inside the first fetch.
    struct CancellingSource {
        cancel: CancelToken,
    }

    impl MatchSource for CancellingSource {
        fn match_participants(
            &self,
            _id: &MatchId,
        ) -> Result<Vec<ParticipantRecord>, DataRetrievalError> {
            self.cancel.cancel();
            Ok(vec![record("Alpha", 1, 1, 1, 1)])
        }
    }

    #[test]
    fn pooled_aggregation_isolates_failed_matches() {
        let mut matches = HashMap::new();
        matches.insert(
            MatchId::from(1u64),
            vec![record("Alpha", 1, 5, 1, 3), record("Beta", 2, 1, 0, 2)],
        );
        matches.insert(
            MatchId::from(2u64),
            vec![record("Alpha", 1, 2, 3, 1), record("Beta", 2, 4, 2, 5)],
        );
        matches.insert(MatchId::from(3u64), vec![record("Alpha", 1, 0, 1, 0)]);

        let aggregator = Aggregator::new(MapSource { matches }).with_workers(2);
        let ids = vec![1u64.into(), 2u64.into(), 3u64.into(), 4u64.into()];
        let outcome = aggregator.aggregate(ids, &CancelToken::new());

        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.fetched, 3);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].match_id, MatchId::from(4u64));
        assert!(!outcome.cancelled);
        assert_eq!(outcome.players["Alpha"].appearances, 3);
        assert_eq!(outcome.players["Alpha"].kda, Kda::new(7, 5, 4));
        assert_eq!(outcome.players["Beta"].appearances, 2);
        assert_eq!(outcome.players["Beta"].kda, Kda::new(5, 2, 7));
    }

    #[test]
    fn rate_limited_fetch_is_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let source = RateLimitedOnce {
            records: vec![record("Alpha", 1, 5, 1, 3)],
            attempts: Arc::clone(&attempts),
        };

        let outcome =
            Aggregator::new(source).aggregate(vec![1u64.into()], &CancelToken::new());

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.fetched, 1);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.players["Alpha"].appearances, 1);
    }

    #[test]
    fn cancellation_surfaces_partial_results() {
        let cancel = CancelToken::new();
        let source = CancellingSource { cancel: cancel.clone() };

        let ids = vec![1u64.into(), 2u64.into(), 3u64.into()];
        let outcome = Aggregator::new(source).with_workers(1).aggregate(ids, &cancel);

        assert!(outcome.cancelled);
        assert_eq!(outcome.fetched, 1);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.players["Alpha"].appearances, 1);
    }

    #[test]
    fn backoff_honors_retry_after_up_to_the_cap() {
        assert_eq!(backoff_delay(Some(5), 1), Duration::from_secs(5));
        assert_eq!(backoff_delay(None, 2), Duration::from_secs(4));
        assert_eq!(
            backoff_delay(Some(9_999_999_999), 1),
            Duration::from_secs(MAX_BACKOFF_SECS)
        );
    }

    #[test]
    fn cancelled_backoff_sleep_returns_promptly() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let start = Instant::now();
        sleep_cancellable(Duration::from_secs(5), &cancel);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn fold_isolates_failed_matches() {
        let results = vec![
            (MatchId::from(1u64), Ok(vec![record("Alpha", 1, 5, 1, 3)])),
            (
                MatchId::from(2u64),
                Err(DataRetrievalError::ParsingFailed(ParsingError::IdentityMissing(4))),
            ),
            (MatchId::from(3u64), Ok(vec![record("Alpha", 2, 2, 3, 1)])),
        ];

        let (players, skipped, fetched) = fold_results(results);

        assert_eq!(fetched, 2);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].match_id, MatchId::from(2u64));
        assert_eq!(players["Alpha"].appearances, 2);
        assert_eq!(players["Alpha"].kda, Kda::new(7, 4, 4));
    }

    #[test]
    fn accumulation_is_commutative() {
        let matches = vec![
            vec![record("Alpha", 1, 5, 1, 3), record("Beta", 2, 1, 0, 2)],
            vec![record("Alpha", 3, 2, 3, 1), record("Beta", 4, 4, 2, 5)],
            vec![record("Alpha", 5, 0, 1, 0)],
        ];

        let mut forward = HashMap::new();
        for records in &matches {
            accumulate(&mut forward, records);
        }

        let mut backward = HashMap::new();
        for records in matches.iter().rev() {
            accumulate(&mut backward, records);
        }

        assert_eq!(forward, backward);
    }

    #[test]
    fn cancel_token_flips_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
