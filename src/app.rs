use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::feed::{FeedPhase, FeedState, RefreshOutcome, Restore};
use crate::fetch::{FetchMsg, Fetcher};
use crate::source::{FetchQuery, Headline, HeadlineId, SourceError};
use crate::store::SnapshotStore;

/// Fires once per interval.  Owned by [`App`], so it goes away with it.
pub struct RevealTimer {
    interval: Duration,
    next: Instant,
}

impl RevealTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// Whether the timer fired since the last call.  Missed ticks collapse
    /// into one.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }
}

pub struct App {
    /// The headline feed being shown.
    pub feed: FeedState,
    store: Box<dyn SnapshotStore>,
    fetcher: Fetcher,
    query: FetchQuery,
    reveal: RevealTimer,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
}

impl App {
    pub fn new(
        store: Box<dyn SnapshotStore>,
        fetcher: Fetcher,
        query: FetchQuery,
        reveal_interval: Duration,
    ) -> Self {
        Self {
            feed: FeedState::new(),
            store,
            fetcher,
            query,
            reveal: RevealTimer::new(reveal_interval, Instant::now()),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
        }
    }

    /// Restore the stored snapshot, or fetch if there is none.
    pub fn start(&mut self) {
        match self.feed.restore(self.store.as_ref()) {
            Restore::Restored(count) => {
                self.status = format!("Loaded {count} stored headlines");
                self.select_first();
            }
            Restore::Empty => self.refresh(),
            Restore::Failed => self.status = "Could not read stored headlines".into(),
        }
    }

    /// Ask the fetch worker for a fresh batch.
    pub fn refresh(&mut self) {
        let ticket = self.feed.begin_refresh();
        if self.fetcher.request(ticket, self.query.clone()) {
            self.status = format!("Fetching \"{}\"…", self.query.topic);
        } else {
            let result = Err(SourceError::Unavailable("fetch worker stopped".into()));
            self.feed.complete_refresh(ticket, result, self.store.as_ref());
            self.status = "Fetch worker stopped".into();
        }
    }

    /// Apply finished fetches and run the reveal timer.
    pub fn tick(&mut self, now: Instant) {
        while let Some(msg) = self.fetcher.try_recv() {
            self.apply_fetch(msg);
        }

        // Keeps running after a failed refresh; the prior headlines stay.
        if self.reveal.due(now) && self.feed.phase() != &FeedPhase::Loading {
            let count = self.feed.reveal_more();
            if count > 0 {
                self.status = format!("{count} more headlines");
            }
        }
    }

    fn apply_fetch(&mut self, msg: FetchMsg) {
        match self
            .feed
            .complete_refresh(msg.ticket, msg.result, self.store.as_ref())
        {
            RefreshOutcome::Applied(count) => {
                self.status = format!("Fetched {count} headlines");
                self.select_first();
            }
            RefreshOutcome::Empty => self.status = "No headlines returned".into(),
            RefreshOutcome::Failed => self.status = "Refresh failed".into(),
            RefreshOutcome::Stale => {}
        }
        self.clamp_selection();
    }

    // -- selection-based actions ---------------------------------------------

    pub fn selected(&self) -> Option<&Headline> {
        let index = self.list_state.selected()?;
        self.feed.render_list().get(index).copied()
    }

    fn selected_id(&self) -> Option<HeadlineId> {
        self.selected().map(|h| h.id.clone())
    }

    pub fn pin_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if self.feed.pin(&id) {
            self.status = "Pinned to top".into();
            // Follow the headline to its new place at the top.
            self.list_state.select(Some(0));
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        if self.feed.delete(&id) {
            self.status = "Deleted".into();
            self.clamp_selection();
        }
    }

    // -- navigation ----------------------------------------------------------

    fn len(&self) -> usize {
        self.feed.render_list().len()
    }

    fn clamp_selection(&mut self) {
        let len = self.len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn select_next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.len() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.len() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::feed::FeedError;
    use crate::fetch;
    use crate::source::testing::{batch, query, Scripted, StubSource};
    use crate::store::testing::MemoryStore;

    pub(crate) fn app_with(stored: &[Headline], script: Vec<Scripted>) -> (App, StubSource) {
        let source = StubSource::new(script);
        let fetcher = fetch::spawn(Box::new(source.clone()));
        let store: Box<dyn SnapshotStore> = if stored.is_empty() {
            Box::new(MemoryStore::default())
        } else {
            Box::new(MemoryStore::with_batch(stored))
        };
        let app = App::new(store, fetcher, query(), Duration::from_secs(10));
        (app, source)
    }

    /// Tick until the worker's answer has been applied.
    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.feed.phase() == &FeedPhase::Loading && Instant::now() < deadline {
            app.tick(Instant::now());
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    // -- reveal timer --------------------------------------------------------

    #[test]
    fn reveal_timer_fires_once_per_interval() {
        let start = Instant::now();
        let mut timer = RevealTimer::new(Duration::from_secs(10), start);

        assert!(!timer.due(start));
        assert!(!timer.due(start + Duration::from_secs(9)));
        assert!(timer.due(start + Duration::from_secs(10)));
        assert!(!timer.due(start + Duration::from_secs(11)));
        assert!(timer.due(start + Duration::from_secs(25)));
    }

    // -- start ---------------------------------------------------------------

    #[test]
    fn start_with_snapshot_is_ready_immediately() {
        let (mut app, source) = app_with(&batch("stored", 12), vec![]);
        app.start();

        assert_eq!(app.feed.phase(), &FeedPhase::Ready);
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn start_without_snapshot_fetches_in_background() {
        let (mut app, source) = app_with(&[], vec![Scripted::Batch(batch("net", 12))]);
        app.start();
        assert_eq!(app.feed.phase(), &FeedPhase::Loading);

        settle(&mut app);

        assert_eq!(source.calls(), 1);
        assert_eq!(app.feed.phase(), &FeedPhase::Ready);
        assert_eq!(app.feed.render_list().len(), 10);
        assert_eq!(app.status, "Fetched 12 headlines");
    }

    #[test]
    fn empty_fetch_surfaces_network_advisory() {
        let (mut app, _source) = app_with(&[], vec![Scripted::Batch(Vec::new())]);
        app.start();
        settle(&mut app);

        assert_eq!(app.feed.phase(), &FeedPhase::Error(FeedError::NetworkEmpty));
        assert!(app.selected().is_none());
    }

    // -- ticking -------------------------------------------------------------

    #[test]
    fn tick_reveals_when_timer_is_due() {
        let (mut app, _source) = app_with(&batch("stored", 30), vec![]);
        app.start();

        app.tick(Instant::now());
        assert_eq!(app.feed.render_list().len(), 10);

        app.tick(Instant::now() + Duration::from_secs(11));
        assert_eq!(app.feed.render_list().len(), 15);
    }

    #[test]
    fn tick_keeps_revealing_after_failed_refresh() {
        let (mut app, _source) = app_with(&batch("stored", 30), vec![Scripted::Fail(500)]);
        app.start();
        app.refresh();
        settle(&mut app);
        assert!(matches!(
            app.feed.phase(),
            FeedPhase::Error(FeedError::RefreshFailed(_))
        ));
        assert_eq!(app.feed.render_list().len(), 10);

        let now = Instant::now();
        app.tick(now + Duration::from_secs(11));
        assert_eq!(app.feed.render_list().len(), 15);
        app.tick(now + Duration::from_secs(22));
        assert_eq!(app.feed.render_list().len(), 20);
    }

    // -- actions -------------------------------------------------------------

    #[test]
    fn pin_selected_moves_it_to_top_and_follows() {
        let (mut app, _source) = app_with(&batch("h", 5), vec![]);
        app.start();
        app.select_next();
        app.select_next();

        app.pin_selected();

        assert_eq!(app.feed.render_list()[0].title, "h 2");
        assert_eq!(app.selected().map(|h| h.title.as_str()), Some("h 2"));
        assert!(app.feed.is_pinned(&app.feed.render_list()[0].id));
    }

    #[test]
    fn delete_last_item_clamps_selection() {
        let (mut app, _source) = app_with(&batch("h", 3), vec![]);
        app.start();
        app.select_last();

        app.delete_selected();

        assert_eq!(app.feed.render_list().len(), 2);
        assert_eq!(app.list_state.selected(), Some(1));
    }

    #[test]
    fn actions_on_empty_feed_are_noops() {
        let (mut app, _source) = app_with(&[], vec![]);
        app.pin_selected();
        app.delete_selected();
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn select_next_clamps_at_last_item() {
        let (mut app, _source) = app_with(&batch("h", 3), vec![]);
        app.start();

        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_clamps_at_zero() {
        let (mut app, _source) = app_with(&batch("h", 3), vec![]);
        app.start();

        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn refresh_keeps_pins_across_fetch() {
        let stored = batch("h", 4);
        let (mut app, _source) = app_with(&stored, vec![Scripted::Batch(stored.clone())]);
        app.start();
        app.select_last();
        app.pin_selected();

        app.refresh();
        settle(&mut app);

        assert_eq!(app.feed.phase(), &FeedPhase::Ready);
        assert_eq!(app.feed.render_list()[0].title, "h 3");
    }
}
