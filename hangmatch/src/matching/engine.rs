use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::{stream, StreamExt};
use nanoid::nanoid;

use crate::config::MatchingConfig;
use crate::db::traits::DatabaseBackend;
use crate::error::{HangError, Result};
use crate::matching::scoring;
use crate::models::{
    CandidateScore, IntentSession, MatchRecord, MatchStatus, ProfileSnapshot, ScoreBreakdown,
    Venue,
};
use crate::venues::VenueSearchProvider;

/// The result of one matching run. Records are returned even when some of
/// their writes failed; `persisted` says how many actually landed.
#[derive(Debug)]
pub struct MatchRunOutcome {
    pub session_id: String,
    pub matches: Vec<MatchRecord>,
    pub venues: Vec<Venue>,
    pub candidates_considered: usize,
    pub persisted: usize,
}

/// Everything about the requester the scorers need, loaded once per run.
struct RequesterContext {
    session: IntentSession,
    profile: ProfileSnapshot,
    neighborhoods: HashSet<String>,
    interests: Vec<String>,
    friend_ids: HashSet<String>,
}

pub struct MatchEngine {
    db: Arc<dyn DatabaseBackend>,
    venues: Arc<VenueSearchProvider>,
    config: MatchingConfig,
}

impl MatchEngine {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        venues: Arc<VenueSearchProvider>,
        config: MatchingConfig,
    ) -> Self {
        Self { db, venues, config }
    }

    /// Score every active candidate session against the requester's, rank the
    /// admitted ones, enrich with venue suggestions, and persist the results.
    pub async fn run(&self, session_id: &str) -> Result<MatchRunOutcome> {
        let now = Utc::now();

        let session = self
            .db
            .get_session_by_id(session_id)
            .await?
            .ok_or_else(|| HangError::NotFound(format!("intent session {session_id}")))?;
        if !session.is_active || session.is_expired(now) {
            return Err(HangError::Validation(format!(
                "intent session {session_id} is no longer active"
            )));
        }

        let ctx = self.load_requester_context(session).await?;
        let candidates = self
            .db
            .get_active_sessions_excluding(&ctx.session.user_id, now)
            .await?;
        let candidates_considered = candidates.len();

        // Venue search runs alongside candidate scoring; neither waits on
        // the other. An empty pool has nothing to enrich, so no call is made.
        let venue_fut = async {
            if candidates_considered == 0 {
                return Vec::new();
            }
            self.venues
                .search(
                    &ctx.session.mood,
                    &ctx.session.activity_types,
                    ctx.profile.home_neighborhood.as_deref(),
                )
                .await
        };
        let scoring_fut = async {
            stream::iter(candidates)
                .map(|candidate| self.score_candidate(&ctx, candidate))
                .buffer_unordered(self.config.candidate_concurrency.max(1))
                .collect::<Vec<Result<CandidateScore>>>()
                .await
        };
        let (venues, scored) = tokio::join!(venue_fut, scoring_fut);

        // A failed candidate drops out of this run; it never aborts the rest.
        let mut admitted: Vec<CandidateScore> = scored
            .into_iter()
            .filter_map(|res| match res {
                Ok(score) => Some(score),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping candidate that failed to score");
                    None
                }
            })
            .filter(|s| s.admitted)
            .collect();

        // Descending by total; candidate user id breaks ties so repeated runs
        // over the same pool rank identically.
        admitted.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        admitted.truncate(self.config.top_k);

        let mut matches = Vec::with_capacity(admitted.len());
        let mut persisted = 0usize;
        for score in admitted {
            let record = MatchRecord {
                id: nanoid!(),
                session_id: ctx.session.id.clone(),
                user_id: ctx.session.user_id.clone(),
                matched_user_id: score.user_id,
                matched_session_id: score.session_id,
                match_score: score.total.round() as i64,
                score_breakdown: score.breakdown,
                suggested_venues: venues.clone(),
                status: MatchStatus::Suggested,
                created_at: now,
            };
            match self.db.create_match(&record).await {
                Ok(()) => persisted += 1,
                Err(e) => {
                    tracing::warn!(
                        match_id = %record.id,
                        matched_user_id = %record.matched_user_id,
                        error = %e,
                        "failed to persist match record"
                    );
                }
            }
            matches.push(record);
        }

        tracing::info!(
            session_id = %ctx.session.id,
            candidates = candidates_considered,
            matched = matches.len(),
            persisted,
            venues = venues.len(),
            "matching run completed"
        );

        Ok(MatchRunOutcome {
            session_id: ctx.session.id.clone(),
            matches,
            venues,
            candidates_considered,
            persisted,
        })
    }

    async fn load_requester_context(&self, session: IntentSession) -> Result<RequesterContext> {
        // A missing profile is scored as empty, not treated as an error; the
        // intake collaborator may lag behind session creation.
        let profile = self
            .db
            .get_profile(&session.user_id)
            .await?
            .unwrap_or_else(|| ProfileSnapshot::new(session.user_id.clone()));
        let locations = self.db.get_locations(&session.user_id).await?;
        let interests = self
            .db
            .get_interests(&session.user_id)
            .await?
            .into_iter()
            .map(|i| i.interest)
            .collect();
        let friend_ids: HashSet<String> = self
            .db
            .get_accepted_friend_ids(&session.user_id)
            .await?
            .into_iter()
            .collect();

        let neighborhoods = scoring::neighborhood_set(&profile, &locations);
        Ok(RequesterContext {
            session,
            profile,
            neighborhoods,
            interests,
            friend_ids,
        })
    }

    async fn score_candidate(
        &self,
        ctx: &RequesterContext,
        candidate: IntentSession,
    ) -> Result<CandidateScore> {
        let profile = self
            .db
            .get_profile(&candidate.user_id)
            .await?
            .unwrap_or_else(|| ProfileSnapshot::new(candidate.user_id.clone()));
        let locations = self.db.get_locations(&candidate.user_id).await?;
        let interests: Vec<String> = self
            .db
            .get_interests(&candidate.user_id)
            .await?
            .into_iter()
            .map(|i| i.interest)
            .collect();

        let neighborhoods = scoring::neighborhood_set(&profile, &locations);
        let breakdown = ScoreBreakdown {
            location: scoring::location_score(
                &ctx.neighborhoods,
                &ctx.profile.train_routes,
                &neighborhoods,
                &profile.train_routes,
            ),
            mood: scoring::mood_energy_score(
                &ctx.session.mood,
                ctx.session.energy_level,
                &candidate.mood,
                candidate.energy_level,
            ),
            time: scoring::time_overlap_score(&ctx.session.time_windows, &candidate.time_windows),
            activity: scoring::activity_interest_score(
                &ctx.session.activity_types,
                &candidate.activity_types,
                &ctx.interests,
                &interests,
            ),
            friend: scoring::friend_bonus(&ctx.friend_ids, &candidate.user_id),
        };

        let total = scoring::weighted_total(&breakdown, &self.config.weights);
        // No shared availability window disqualifies outright, whatever the
        // other dimensions add up to.
        let admitted = breakdown.time > 0 && total >= self.config.admission_floor;

        Ok(CandidateScore {
            user_id: candidate.user_id,
            session_id: candidate.id,
            total,
            breakdown,
            admitted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::{DatabaseConfig, VenueSearchConfig};
    use crate::db::repository::{
        FriendshipRepository, MatchRepository, ProfileRepository, SessionRepository,
    };
    use crate::db::traits::{FriendshipStore, MatchStore, ProfileStore, SessionStore};
    use crate::db::{Database, LibSqlBackend};
    use crate::models::{FriendshipEdge, FriendshipStatus, TimeWindow, UserInterest, UserLocation};

    async fn setup_test_db() -> Database {
        use std::time::{SystemTime, UNIX_EPOCH};

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let thread_id = std::thread::current().id();

        let config = DatabaseConfig {
            url: format!(
                "file:/tmp/hangmatch_engine_test_{thread_id:?}_{timestamp}?mode=memory&cache=shared"
            ),
            ..DatabaseConfig::default()
        };
        Database::new(&config).await.expect("Failed to create database")
    }

    fn engine_with(db: Database, config: MatchingConfig) -> MatchEngine {
        MatchEngine::new(
            Arc::new(LibSqlBackend::new(db)),
            Arc::new(VenueSearchProvider::new(None)),
            config,
        )
    }

    fn evening_window() -> TimeWindow {
        TimeWindow {
            date: "2025-01-10".to_string(),
            start: "18:00".to_string(),
            end: "20:00".to_string(),
        }
    }

    async fn seed_session(
        db: &Database,
        id: &str,
        user_id: &str,
        mood: &str,
        energy: i64,
        windows: Vec<TimeWindow>,
    ) {
        let conn = db.connect().unwrap();
        let mut session =
            IntentSession::new(id.to_string(), user_id.to_string(), mood.to_string(), 48);
        session.energy_level = energy;
        session.time_windows = windows;
        session.activity_types = vec!["Coffee".to_string()];
        SessionRepository::create(&conn, &session).await.unwrap();
    }

    async fn seed_profile(db: &Database, user_id: &str, home: &str) {
        let conn = db.connect().unwrap();
        let mut profile = ProfileSnapshot::new(user_id.to_string());
        profile.home_neighborhood = Some(home.to_string());
        ProfileRepository::create(&conn, &profile).await.unwrap();
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let db = setup_test_db().await;
        let engine = engine_with(db, MatchingConfig::default());

        let err = engine.run("ghost").await.unwrap_err();
        assert!(matches!(err, HangError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_session_is_rejected() {
        let db = setup_test_db().await;
        {
            let conn = db.connect().unwrap();
            let mut session = IntentSession::new(
                "stale".to_string(),
                "alice".to_string(),
                "chill".to_string(),
                48,
            );
            session.expires_at = Utc::now() - chrono::Duration::hours(1);
            SessionRepository::create(&conn, &session).await.unwrap();
        }
        let engine = engine_with(db, MatchingConfig::default());

        let err = engine.run("stale").await.unwrap_err();
        assert!(matches!(err, HangError::Validation(_)));
    }

    #[tokio::test]
    async fn run_ranks_persists_and_gates_on_time() {
        let db = setup_test_db().await;

        seed_profile(&db, "alice", "Williamsburg").await;
        seed_profile(&db, "bob", "Williamsburg").await;
        seed_profile(&db, "carol", "Harlem").await;
        seed_profile(&db, "dave", "Astoria").await;

        seed_session(&db, "sess-alice", "alice", "chill", 5, vec![evening_window()]).await;
        // bob: same mood, same energy, shared neighborhood, overlapping window
        seed_session(&db, "sess-bob", "bob", "chill", 5, vec![evening_window()]).await;
        // carol: compatible but weaker
        seed_session(&db, "sess-carol", "carol", "deep_talk", 3, vec![evening_window()]).await;
        // dave: perfect mood but no shared window, must be gated out
        seed_session(
            &db,
            "sess-dave",
            "dave",
            "chill",
            5,
            vec![TimeWindow {
                date: "2025-01-12".to_string(),
                start: "18:00".to_string(),
                end: "20:00".to_string(),
            }],
        )
        .await;

        let engine = engine_with(db.clone(), MatchingConfig::default());
        let outcome = engine.run("sess-alice").await.unwrap();

        assert_eq!(outcome.candidates_considered, 3);
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].matched_user_id, "bob");
        assert_eq!(outcome.matches[1].matched_user_id, "carol");
        assert!(outcome.matches[0].match_score > outcome.matches[1].match_score);
        assert_eq!(outcome.persisted, 2);
        assert!(outcome.venues.is_empty());

        // records are readable back with status suggested
        let conn = db.connect().unwrap();
        let stored = crate::db::repository::MatchRepository::list_for_session(&conn, "sess-alice")
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].status, MatchStatus::Suggested);
        assert_eq!(stored[0].matched_user_id, "bob");
        assert!(stored[0].score_breakdown.time > 0);
    }

    #[tokio::test]
    async fn stranger_with_shared_window_scores_fifty_eight() {
        let db = setup_test_db().await;

        // no profiles, no activities, no friendship; only mood, energy, and
        // an overlapping evening window
        {
            let conn = db.connect().unwrap();
            for (id, user) in [("sess-alice", "alice"), ("sess-bob", "bob")] {
                let mut session =
                    IntentSession::new(id.to_string(), user.to_string(), "chill".to_string(), 48);
                session.time_windows = vec![TimeWindow {
                    date: "2025-01-10".to_string(),
                    start: if user == "alice" { "18:00" } else { "19:00" }.to_string(),
                    end: if user == "alice" { "20:00" } else { "21:00" }.to_string(),
                }];
                SessionRepository::create(&conn, &session).await.unwrap();
            }
        }

        let engine = engine_with(db, MatchingConfig::default());
        let outcome = engine.run("sess-alice").await.unwrap();

        assert_eq!(outcome.matches.len(), 1);
        let record = &outcome.matches[0];
        assert_eq!(record.score_breakdown.location, 0);
        assert_eq!(record.score_breakdown.mood, 100);
        assert_eq!(record.score_breakdown.time, 100);
        assert_eq!(record.score_breakdown.activity, 50);
        assert_eq!(record.score_breakdown.friend, 0);
        // 0.25*100 + 0.25*100 + 0.15*50 = 57.5, rounded to 58
        assert_eq!(record.match_score, 58);
    }

    #[tokio::test]
    async fn friendship_bonus_breaks_otherwise_equal_candidates() {
        let db = setup_test_db().await;

        seed_profile(&db, "alice", "Williamsburg").await;
        seed_profile(&db, "bob", "Harlem").await;
        seed_profile(&db, "carol", "Harlem").await;
        {
            let conn = db.connect().unwrap();
            FriendshipRepository::create(
                &conn,
                &FriendshipEdge {
                    id: "f1".to_string(),
                    user_id: "carol".to_string(),
                    friend_id: "alice".to_string(),
                    status: FriendshipStatus::Accepted,
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();
        }

        seed_session(&db, "sess-alice", "alice", "chill", 5, vec![evening_window()]).await;
        seed_session(&db, "sess-bob", "bob", "chill", 5, vec![evening_window()]).await;
        seed_session(&db, "sess-carol", "carol", "chill", 5, vec![evening_window()]).await;

        let engine = engine_with(db, MatchingConfig::default());
        let outcome = engine.run("sess-alice").await.unwrap();

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].matched_user_id, "carol");
        assert_eq!(outcome.matches[0].score_breakdown.friend, 100);
        assert_eq!(outcome.matches[1].score_breakdown.friend, 0);
    }

    #[tokio::test]
    async fn equal_totals_rank_by_candidate_user_id() {
        let db = setup_test_db().await;

        seed_profile(&db, "alice", "Williamsburg").await;
        seed_session(&db, "sess-alice", "alice", "chill", 5, vec![evening_window()]).await;
        // identical candidates apart from their ids
        for user in ["zoe", "ben"] {
            seed_profile(&db, user, "Harlem").await;
            seed_session(
                &db,
                &format!("sess-{user}"),
                user,
                "chill",
                5,
                vec![evening_window()],
            )
            .await;
        }

        let engine = engine_with(db, MatchingConfig::default());
        let outcome = engine.run("sess-alice").await.unwrap();

        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.matches[0].match_score, outcome.matches[1].match_score);
        assert_eq!(outcome.matches[0].matched_user_id, "ben");
        assert_eq!(outcome.matches[1].matched_user_id, "zoe");
    }

    #[tokio::test]
    async fn admission_floor_and_top_k_are_respected() {
        let db = setup_test_db().await;

        seed_profile(&db, "alice", "Williamsburg").await;
        seed_session(&db, "sess-alice", "alice", "chill", 5, vec![evening_window()]).await;

        // strong candidate, clears a raised floor
        seed_profile(&db, "bob", "Williamsburg").await;
        seed_session(&db, "sess-bob", "bob", "chill", 5, vec![evening_window()]).await;
        // weak candidate, incompatible mood and far energy: total lands
        // around 46, below a floor of 60
        seed_profile(&db, "carol", "Harlem").await;
        seed_session(&db, "sess-carol", "carol", "party", 10, vec![evening_window()]).await;

        let config = MatchingConfig {
            admission_floor: 60.0,
            top_k: 1,
            ..MatchingConfig::default()
        };
        let engine = engine_with(db, config);
        let outcome = engine.run("sess-alice").await.unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].matched_user_id, "bob");
    }

    #[tokio::test]
    async fn empty_candidate_pool_skips_venue_search() {
        let db = setup_test_db().await;
        seed_session(&db, "sess-alice", "alice", "chill", 5, vec![evening_window()]).await;

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})),
            )
            .mount(&server)
            .await;

        let provider = VenueSearchProvider::new(Some(VenueSearchConfig {
            api_key: "tvly-test".to_string(),
            base_url: server.uri(),
            max_results: 5,
            timeout_secs: 5,
        }));
        let engine = MatchEngine::new(
            Arc::new(LibSqlBackend::new(db)),
            Arc::new(provider),
            MatchingConfig::default(),
        );
        let outcome = engine.run("sess-alice").await.unwrap();

        assert_eq!(outcome.candidates_considered, 0);
        assert!(outcome.matches.is_empty());
        assert!(outcome.venues.is_empty());
        // no candidates means no outbound search call at all
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    /// Backend that refuses to persist match records against one user and
    /// delegates everything else.
    struct FailingWriteBackend {
        inner: LibSqlBackend,
        fail_for: String,
    }

    #[async_trait]
    impl SessionStore for FailingWriteBackend {
        async fn create_session(&self, session: &IntentSession) -> Result<()> {
            self.inner.create_session(session).await
        }
        async fn get_session_by_id(&self, id: &str) -> Result<Option<IntentSession>> {
            self.inner.get_session_by_id(id).await
        }
        async fn get_active_sessions_excluding(
            &self,
            user_id: &str,
            now: DateTime<Utc>,
        ) -> Result<Vec<IntentSession>> {
            self.inner.get_active_sessions_excluding(user_id, now).await
        }
        async fn deactivate_sessions_for_user(&self, user_id: &str) -> Result<u64> {
            self.inner.deactivate_sessions_for_user(user_id).await
        }
        async fn deactivate_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
            self.inner.deactivate_expired_sessions(now).await
        }
    }

    #[async_trait]
    impl ProfileStore for FailingWriteBackend {
        async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>> {
            self.inner.get_profile(user_id).await
        }
        async fn get_locations(&self, user_id: &str) -> Result<Vec<UserLocation>> {
            self.inner.get_locations(user_id).await
        }
        async fn get_interests(&self, user_id: &str) -> Result<Vec<UserInterest>> {
            self.inner.get_interests(user_id).await
        }
    }

    #[async_trait]
    impl FriendshipStore for FailingWriteBackend {
        async fn get_accepted_friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
            self.inner.get_accepted_friend_ids(user_id).await
        }
    }

    #[async_trait]
    impl MatchStore for FailingWriteBackend {
        async fn create_match(&self, record: &MatchRecord) -> Result<()> {
            if record.matched_user_id == self.fail_for {
                return Err(HangError::Internal("simulated write failure".to_string()));
            }
            self.inner.create_match(record).await
        }
        async fn get_match_by_id(&self, id: &str) -> Result<Option<MatchRecord>> {
            self.inner.get_match_by_id(id).await
        }
        async fn list_matches_for_session(&self, session_id: &str) -> Result<Vec<MatchRecord>> {
            self.inner.list_matches_for_session(session_id).await
        }
        async fn update_match_status(&self, id: &str, status: MatchStatus) -> Result<bool> {
            self.inner.update_match_status(id, status).await
        }
    }

    #[async_trait]
    impl DatabaseBackend for FailingWriteBackend {
        async fn ping(&self) -> Result<()> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn write_failure_for_one_record_does_not_abort_the_run() {
        let db = setup_test_db().await;

        seed_profile(&db, "alice", "Williamsburg").await;
        seed_profile(&db, "bob", "Williamsburg").await;
        seed_profile(&db, "carol", "Harlem").await;
        seed_session(&db, "sess-alice", "alice", "chill", 5, vec![evening_window()]).await;
        seed_session(&db, "sess-bob", "bob", "chill", 5, vec![evening_window()]).await;
        seed_session(&db, "sess-carol", "carol", "chill", 5, vec![evening_window()]).await;

        let backend = FailingWriteBackend {
            inner: LibSqlBackend::new(db.clone()),
            fail_for: "bob".to_string(),
        };
        let engine = MatchEngine::new(
            Arc::new(backend),
            Arc::new(VenueSearchProvider::new(None)),
            MatchingConfig::default(),
        );
        let outcome = engine.run("sess-alice").await.unwrap();

        // both ranked records are reported, only one landed
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.persisted, 1);
        assert!(outcome.matches.iter().any(|m| m.matched_user_id == "bob"));

        let conn = db.connect().unwrap();
        let stored = MatchRepository::list_for_session(&conn, "sess-alice")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].matched_user_id, "carol");
    }
}
