//! Game session lifecycle: start, score reporting and finalization.
//!
//! Sessions move NotStarted -> Active -> Ended, with Ended terminal. All
//! state is externalized to the session store and looked up by session id
//! on every call; nothing holds a session open between requests.
//! Finalization runs the reward calculator, progression ledger, streak
//! tracker and achievement evaluator in that order inside one write
//! transaction, so either the whole sequence commits or none of it does.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::rewards::compute_rewards;
use super::types::{GameSession, GameType, SessionSummary, TrackingMethod, TrackingSample};
use crate::achievements::{AchievementEvaluator, ProgressSnapshot};
use crate::progression::ledger::ProgressionLedger;
use crate::progression::SessionOutcome;
use crate::storage::game_store::GameStore;
use crate::storage::{Database, DatabaseError};

/// Session lifecycle errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The supplied user id resolves to no known user
    #[error("Not authenticated")]
    NotAuthenticated,

    /// No active session with this id belongs to the caller
    #[error("No active session: {0}")]
    NoActiveSession(Uuid),

    /// The session was already finalized; rewards were not applied again
    #[error("Session already finalized: {0}")]
    DuplicateFinalization(Uuid),

    /// Storage failure; retryable by the caller
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Orchestrates game sessions end-to-end.
pub struct SessionManager {
    db: Arc<Database>,
    evaluator: AchievementEvaluator,
}

impl SessionManager {
    /// Create a session manager over the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            evaluator: AchievementEvaluator::new(),
        }
    }

    /// Start a new session for a user.
    ///
    /// A still-active session for the same user is silently replaced: its
    /// row and samples are discarded, matching client behavior where a new
    /// game simply starts over an abandoned one.
    pub fn start_session(
        &self,
        user_id: Uuid,
        game_type: GameType,
        tracking_method: TrackingMethod,
    ) -> Result<Uuid, SessionError> {
        let tx = self.db.transaction()?;
        let store = GameStore::new(&tx);

        let user = ProgressionLedger::new(&tx)
            .get_user(user_id)?
            .ok_or(SessionError::NotAuthenticated)?;

        if let Some(stale) = store.active_session(user_id)? {
            if stale.score > 0 {
                tracing::warn!(
                    session_id = %stale.session_id,
                    score = stale.score,
                    "replacing active session; in-progress score discarded"
                );
            } else {
                tracing::debug!(session_id = %stale.session_id, "replacing active session");
            }
            store.delete_session(stale.session_id)?;
        }

        let session = GameSession::new(
            user_id,
            user.username,
            game_type,
            tracking_method,
            Utc::now(),
        );
        store.insert_session(&session)?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::debug!(session_id = %session.session_id, %game_type, "session started");
        Ok(session.session_id)
    }

    /// Report the current cumulative score for an active session.
    ///
    /// The score overwrites the session's previous score (clients report
    /// the full in-game total, not a delta); the tracking sample is
    /// appended. Negative scores are clamped to 0. Returns the stored
    /// score.
    pub fn report_score(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        score: i64,
        sample: TrackingSample,
    ) -> Result<u32, SessionError> {
        let score = score.max(0) as u32;

        let tx = self.db.transaction()?;
        let store = GameStore::new(&tx);

        let session = store
            .get_session(session_id)?
            .ok_or(SessionError::NoActiveSession(session_id))?;
        if session.user_id != user_id || !session.is_active() {
            return Err(SessionError::NoActiveSession(session_id));
        }

        if store.update_score(session_id, score)? == 0 {
            return Err(SessionError::NoActiveSession(session_id));
        }
        store.insert_sample(session_id, &sample)?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(score)
    }

    /// Finalize a session now.
    pub fn end_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<SessionSummary, SessionError> {
        self.end_session_at(user_id, session_id, Utc::now())
    }

    /// Finalize a session with an explicit clock.
    ///
    /// Used by backfilled external syncs and deterministic tests; `now`
    /// decides the session duration and the streak's calendar day.
    pub fn end_session_at(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SessionSummary, SessionError> {
        let tx = self.db.transaction()?;
        let store = GameStore::new(&tx);
        let ledger = ProgressionLedger::new(&tx);

        let session = store
            .get_session(session_id)?
            .ok_or(SessionError::NoActiveSession(session_id))?;
        if session.user_id != user_id {
            return Err(SessionError::NoActiveSession(session_id));
        }
        if !session.is_active() {
            return Err(SessionError::DuplicateFinalization(session_id));
        }

        let duration_minutes =
            ((now - session.start_time).num_milliseconds() as f64 / 60_000.0).max(0.0);
        let rewards = compute_rewards(session.game_type, session.score, duration_minutes);

        // The guard on end_time makes finalization exactly-once even if two
        // requests race past the state check above
        if store.finalize_session(
            session_id,
            now,
            duration_minutes,
            rewards.points,
            rewards.calories,
        )? == 0
        {
            return Err(SessionError::DuplicateFinalization(session_id));
        }

        let outcome = SessionOutcome {
            game_type: session.game_type,
            score: session.score,
            points: rewards.points,
            calories: rewards.calories,
            duration_minutes,
        };
        let (user, stat) = ledger.apply_session_outcome(user_id, &outcome, now)?;

        let mut streak = store.get_streak(user_id)?.unwrap_or_default();
        streak.record_activity(now.date_naive());
        store.put_streak(user_id, &streak)?;

        // Achievements see the post-ledger, post-streak aggregates
        let snapshot = ProgressSnapshot {
            total_games: ledger.total_games(user_id)?,
            current_streak: streak.current_streak,
            best_scores: ledger
                .list_game_stats(user_id)?
                .into_iter()
                .map(|s| (s.game_type, s.best_score))
                .collect(),
            lifetime_calories: user.calories_burned,
        };
        let new_achievements = self.evaluator.evaluate(&store, user_id, &snapshot, now)?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::info!(
            session_id = %session_id,
            game_type = %session.game_type,
            score = session.score,
            points = rewards.points,
            "session finalized"
        );

        Ok(SessionSummary {
            session_id,
            game_type: session.game_type,
            score: session.score,
            points_earned: rewards.points,
            calories_burned: rewards.calories,
            duration_minutes,
            total_points: user.points,
            level: user.level(),
            new_achievements,
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            best_score: stat.best_score,
            is_personal_best: session.score == stat.best_score,
        })
    }
}
