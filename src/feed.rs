//! The headline feed: which headlines are known, which are on screen, and
//! which the user pinned.
//!
//! [`FeedState`] keeps three views of one batch:
//!
//! * **pool**: every headline from the last snapshot restore or refresh,
//! * **displayed**: the non-pinned headlines currently revealed,
//! * **pinned**: headlines the user promoted, newest pin first.
//!
//! `displayed` and `pinned` hold ids into `pool` and never overlap, so
//! [`FeedState::render_list`] can simply concatenate them.
//!
//! The feed does no scheduling of its own.  Periodic reveals and background
//! fetching are driven by the caller (see `app.rs` and `fetch.rs`); the feed
//! only exposes the operations and keeps every transition atomic.

use std::collections::HashSet;

use crate::source::{FetchQuery, Headline, HeadlineId, NewsSource, SourceError};
use crate::store::{SnapshotStore, StoreError};

/// Number of headlines shown right after a restore or refresh.
pub const INITIAL_WINDOW: usize = 10;

/// Maximum number of headlines one [`FeedState::reveal_more`] adds.
pub const REVEAL_STEP: usize = 5;

/// Why the feed is in its error phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("could not read the stored snapshot: {0}")]
    LoadFailed(String),
    #[error("refresh failed: {0}")]
    RefreshFailed(String),
    /// The source answered with zero articles.  At this layer that cannot be
    /// told apart from a silent upstream failure, so it is surfaced.
    #[error("refresh returned no articles")]
    NetworkEmpty,
}

impl FeedError {
    /// Message shown to the user.
    pub fn advisory(&self) -> &'static str {
        match self {
            FeedError::LoadFailed(_) => "Failed to load news. Please try again.",
            FeedError::RefreshFailed(_) => "Failed to refresh news. Please try again.",
            FeedError::NetworkEmpty => {
                "Unable to fetch news. Please check your internet connection and try again."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPhase {
    Loading,
    Ready,
    Error(FeedError),
}

/// Handle for one refresh.  Only the most recently issued ticket may apply
/// its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

/// Result of reading the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// The snapshot held this many headlines and they were adopted.
    Restored(usize),
    /// Nothing usable was stored; the caller should refresh.
    Empty,
    /// The store could not be read.  The feed is in its error phase.
    Failed,
}

/// Result of applying a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(usize),
    Empty,
    Failed,
    /// A newer refresh was started after this one; the result was dropped.
    Stale,
}

pub struct FeedState {
    pool: Vec<Headline>,
    displayed: Vec<HeadlineId>,
    pinned: Vec<HeadlineId>,
    phase: FeedPhase,
    generation: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            displayed: Vec::new(),
            pinned: Vec::new(),
            phase: FeedPhase::Loading,
            generation: 0,
        }
    }

    // -- accessors -----------------------------------------------------------

    pub fn phase(&self) -> &FeedPhase {
        &self.phase
    }

    pub fn pool(&self) -> &[Headline] {
        &self.pool
    }

    pub fn get(&self, id: &HeadlineId) -> Option<&Headline> {
        self.pool.iter().find(|h| &h.id == id)
    }

    pub fn displayed(&self) -> Vec<&Headline> {
        self.resolve(&self.displayed)
    }

    pub fn pinned(&self) -> Vec<&Headline> {
        self.resolve(&self.pinned)
    }

    pub fn is_pinned(&self, id: &HeadlineId) -> bool {
        self.pinned.contains(id)
    }

    /// What the user sees: pinned headlines first, then the revealed ones.
    pub fn render_list(&self) -> Vec<&Headline> {
        let mut list = self.pinned();
        list.extend(
            self.displayed
                .iter()
                .filter(|id| !self.pinned.contains(id))
                .filter_map(|id| self.get(id)),
        );
        list
    }

    fn resolve(&self, ids: &[HeadlineId]) -> Vec<&Headline> {
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    // -- loading -------------------------------------------------------------

    /// Restore from `store`, falling back to one fetch from `source` when
    /// nothing usable is stored.
    ///
    /// This is the synchronous form for callers without a fetch worker.
    /// `App::start` does the same with [`restore`](Self::restore) and a
    /// background refresh.
    pub fn initial_load(
        &mut self,
        store: &dyn SnapshotStore,
        source: &dyn NewsSource,
        query: &FetchQuery,
    ) -> Restore {
        let restore = self.restore(store);
        if restore == Restore::Empty {
            self.refresh(store, source, query);
        }
        restore
    }

    /// The snapshot half of [`initial_load`](Self::initial_load).
    ///
    /// On [`Restore::Empty`] the feed stays in its loading phase; the caller
    /// is expected to start a refresh.
    pub fn restore(&mut self, store: &dyn SnapshotStore) -> Restore {
        self.phase = FeedPhase::Loading;

        let batch = match store.load() {
            Ok(batch) => batch,
            Err(StoreError::Malformed(e)) => {
                tracing::warn!(error = %e, "stored snapshot is unreadable, treating as empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored snapshot");
                self.phase = FeedPhase::Error(FeedError::LoadFailed(e.to_string()));
                return Restore::Failed;
            }
        };

        if batch.is_empty() {
            tracing::info!("no stored snapshot, fetching");
            return Restore::Empty;
        }

        self.adopt(batch, false);
        tracing::info!(count = self.pool.len(), "restored snapshot");
        self.phase = FeedPhase::Ready;
        Restore::Restored(self.pool.len())
    }

    /// Fetch from `source` and apply the result in one go.
    pub fn refresh(
        &mut self,
        store: &dyn SnapshotStore,
        source: &dyn NewsSource,
        query: &FetchQuery,
    ) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        let result = source.fetch(query);
        self.complete_refresh(ticket, result, store)
    }

    /// Start a refresh whose fetch runs elsewhere.  Any ticket issued before
    /// this one becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        self.phase = FeedPhase::Loading;
        RefreshTicket(self.generation)
    }

    /// Apply the fetch result for `ticket`.
    ///
    /// A non-empty batch is saved to `store` (a failed save is logged and
    /// otherwise ignored) and replaces the pool.  Pins whose headline is in
    /// the new batch survive.  Empty and failed fetches leave the current
    /// headlines in place and put the feed in its error phase.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Headline>, SourceError>,
        store: &dyn SnapshotStore,
    ) -> RefreshOutcome {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "dropping stale refresh result"
            );
            return RefreshOutcome::Stale;
        }

        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed");
                self.phase = FeedPhase::Error(FeedError::RefreshFailed(e.to_string()));
                return RefreshOutcome::Failed;
            }
        };

        if batch.is_empty() {
            tracing::warn!("refresh returned no articles");
            self.phase = FeedPhase::Error(FeedError::NetworkEmpty);
            return RefreshOutcome::Empty;
        }

        if let Err(e) = store.save(&batch) {
            tracing::warn!(error = %e, "could not save snapshot, keeping it in memory only");
        }

        self.adopt(batch, true);
        tracing::info!(
            count = self.pool.len(),
            pinned = self.pinned.len(),
            "refresh applied"
        );
        self.phase = FeedPhase::Ready;
        RefreshOutcome::Applied(self.pool.len())
    }

    /// Replace the pool with `batch`, de-duplicated by id, and reset the
    /// window.  With `keep_pins`, pins still present in the batch are kept.
    fn adopt(&mut self, batch: Vec<Headline>, keep_pins: bool) {
        let mut seen = HashSet::with_capacity(batch.len());
        let pool: Vec<Headline> = batch
            .into_iter()
            .filter(|h| seen.insert(h.id.clone()))
            .collect();

        let pinned: Vec<HeadlineId> = if keep_pins {
            self.pinned
                .iter()
                .filter(|id| seen.contains(*id))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let displayed = pool
            .iter()
            .map(|h| &h.id)
            .filter(|id| !pinned.contains(id))
            .take(INITIAL_WINDOW)
            .cloned()
            .collect();

        self.pool = pool;
        self.pinned = pinned;
        self.displayed = displayed;
    }

    // -- user actions --------------------------------------------------------

    /// Reveal up to [`REVEAL_STEP`] headlines that are neither displayed nor
    /// pinned, in pool order, after the ones already shown.  Returns how many
    /// were added.
    pub fn reveal_more(&mut self) -> usize {
        let fresh: Vec<HeadlineId> = self
            .pool
            .iter()
            .map(|h| &h.id)
            .filter(|id| !self.displayed.contains(id) && !self.pinned.contains(id))
            .take(REVEAL_STEP)
            .cloned()
            .collect();

        let count = fresh.len();
        if count > 0 {
            self.displayed.extend(fresh);
            tracing::debug!(count, displayed = self.displayed.len(), "revealed headlines");
        }
        count
    }

    /// Pin `id` to the top.  The newest pin goes first.  Returns `false` if
    /// it was already pinned or is unknown.
    pub fn pin(&mut self, id: &HeadlineId) -> bool {
        if self.is_pinned(id) || self.get(id).is_none() {
            return false;
        }
        self.displayed.retain(|d| d != id);
        self.pinned.insert(0, id.clone());
        true
    }

    /// Remove `id` from every view.  Returns `false` if it was not present.
    pub fn delete(&mut self, id: &HeadlineId) -> bool {
        let before = self.pool.len() + self.displayed.len() + self.pinned.len();
        self.pool.retain(|h| &h.id != id);
        self.displayed.retain(|d| d != id);
        self.pinned.retain(|p| p != id);
        before != self.pool.len() + self.displayed.len() + self.pinned.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
