//! headline-tui — a terminal news reader with pinning and a slow reveal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  FetchMsg  ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │ ◄───────── │ (owner)  │          │ (render) │
//! └──────────┘ FetchReq.  └──────────┘          └──────────┘
//!                           │    ▲
//!                 restore / │    │ handle_key_event()
//!                 save      ▼    │
//!                 ┌──────────┐ ┌──────────┐
//!                 │ store/   │ │ input.rs │
//!                 └──────────┘ └──────────┘
//! ```
//!
//! * **`source/`** — the `NewsSource` trait, the `Headline` record and the
//!   NewsAPI client.
//! * **`store/`** — the single JSON snapshot of the last batch.
//! * **`feed`** — the headline state machine: pool, displayed, pinned.
//! * **`fetch`** — a background thread that runs blocking fetches.
//! * **`app`** — owns the feed, the store, the fetch worker and the reveal
//!   timer; applies fetch results between frames.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` actions.
//! * **`config`** — CLI flags, environment and the TOML config file.
//! * **`main.rs`** — the binary: config, logging, terminal setup and the
//!   event loop.

pub mod app;
pub mod config;
pub mod feed;
pub mod fetch;
pub mod input;
pub mod source;
pub mod store;
pub mod ui;
