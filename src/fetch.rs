//! Background fetching.
//!
//! Network fetches block, so they run on a dedicated worker thread instead of
//! the UI loop.  The UI sends a [`FetchRequest`] and later drains the
//! matching [`FetchMsg`]; the feed decides whether the result is still
//! current using the [`RefreshTicket`] carried along.
//!
//! The worker exits once the [`Fetcher`] is dropped.  A fetch already in
//! flight runs to completion and its result is discarded.

use std::sync::mpsc;
use std::thread;

use crate::feed::RefreshTicket;
use crate::source::{FetchQuery, Headline, NewsSource, SourceError};

/// A fetch the UI wants done.
pub struct FetchRequest {
    pub ticket: RefreshTicket,
    pub query: FetchQuery,
}

/// A finished fetch, sent back to the UI thread.
pub struct FetchMsg {
    pub ticket: RefreshTicket,
    pub result: Result<Vec<Headline>, SourceError>,
}

/// UI-side handle to the worker thread.
pub struct Fetcher {
    requests: mpsc::Sender<FetchRequest>,
    results: mpsc::Receiver<FetchMsg>,
}

impl Fetcher {
    /// Queue a fetch.  Returns `false` if the worker is gone.
    pub fn request(&self, ticket: RefreshTicket, query: FetchQuery) -> bool {
        self.requests.send(FetchRequest { ticket, query }).is_ok()
    }

    /// Next finished fetch, if any, without blocking.
    pub fn try_recv(&self) -> Option<FetchMsg> {
        self.results.try_recv().ok()
    }
}

/// Spawn the worker thread that owns `source`.
pub fn spawn(source: Box<dyn NewsSource>) -> Fetcher {
    let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
    let (result_tx, result_rx) = mpsc::channel();

    thread::spawn(move || {
        // Ends when every request sender is dropped.
        for FetchRequest { ticket, query } in request_rx {
            tracing::debug!(source = source.name(), topic = %query.topic, "fetching");
            let result = source.fetch(&query);
            if let Err(e) = &result {
                tracing::warn!(source = source.name(), error = %e, "fetch failed");
            }
            // If the receiver is gone the UI has exited; stop.
            if result_tx.send(FetchMsg { ticket, result }).is_err() {
                return;
            }
        }
        tracing::debug!("fetch worker stopped");
    });

    Fetcher {
        requests: request_tx,
        results: result_rx,
    }
}
