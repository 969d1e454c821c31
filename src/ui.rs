//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a two-row split: the headline list (or a loading / error
//!   panel when there is nothing to list) on top and a one-line status bar at
//!   the bottom.
//! * Colours and styles are defined inline.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::feed::FeedPhase;
use crate::source::Headline;

const TITLE: &str = " Headlines ";

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    if app.feed.render_list().is_empty() {
        draw_placeholder(app, frame, main_area);
    } else {
        draw_headline_list(app, frame, main_area);
    }
    draw_status_bar(app, frame, status_area);
}

/// Loading spinner, error advisory with retry hint, or an empty notice.
fn draw_placeholder(app: &App, frame: &mut Frame, area: Rect) {
    let lines = match app.feed.phase() {
        FeedPhase::Loading => vec![Line::styled(
            "Loading headlines…",
            Style::default().fg(Color::Blue),
        )],
        FeedPhase::Error(err) => vec![
            Line::styled(err.advisory(), Style::default().fg(Color::Red)),
            Line::raw(""),
            Line::styled("Press r to try again", Style::default().fg(Color::DarkGray)),
        ],
        FeedPhase::Ready => vec![Line::styled(
            "No headlines. Press r to refresh.",
            Style::default().fg(Color::DarkGray),
        )],
    };

    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(TITLE).borders(Borders::ALL));
    frame.render_widget(panel, area);
}

/// Render the scrollable headline list, pinned entries first.
fn draw_headline_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .feed
        .render_list()
        .into_iter()
        .map(|item| headline_item(item, app.feed.is_pinned(&item.id)))
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(TITLE).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn headline_item(item: &Headline, pinned: bool) -> ListItem<'static> {
    let time = item
        .published_at
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();

    let mut top = Vec::new();
    if pinned {
        top.push(Span::styled(
            "📌 Pinned  ",
            Style::default().fg(Color::LightBlue),
        ));
    }
    top.push(Span::styled(
        item.source_name
            .clone()
            .unwrap_or_else(|| "Unknown Source".into()),
        Style::default().fg(Color::Cyan),
    ));
    top.push(Span::raw("  "));
    top.push(Span::styled(time, Style::default().fg(Color::DarkGray)));

    let title = Line::from(Span::styled(
        item.title.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    let author = Line::from(Span::styled(
        item.author.clone().unwrap_or_else(|| "Unknown Author".into()),
        Style::default().fg(Color::Gray),
    ));

    ListItem::new(vec![Line::from(top), title, author, Line::raw("")])
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let state = match app.feed.phase() {
        FeedPhase::Loading => Span::styled("⟳ loading", Style::default().fg(Color::Blue)),
        FeedPhase::Ready => Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow)),
        FeedPhase::Error(err) => Span::styled(err.advisory(), Style::default().fg(Color::Red)),
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        state,
        Span::raw("  "),
        Span::styled(
            format!(
                "{} shown, {} pinned, {} total",
                app.feed.render_list().len(),
                app.feed.pinned().len(),
                app.feed.pool().len()
            ),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  p: pin  d: delete  r: refresh"),
    ]));
    frame.render_widget(status, area);
}
