//! Plain-text rendering of the session views.

use std::fmt::Write as _;

use client_core::{
    views::{ChatView, GridView, SelectionPanel},
    AdvisorEvent, SessionViews,
};

pub fn grid(view: &GridView) -> String {
    match view {
        GridView::Placeholder(text) => format!("[products] {text}\n"),
        GridView::Cards(cards) if cards.is_empty() => "[products] none in this category\n".into(),
        GridView::Cards(cards) => {
            let mut out = String::from("[products]\n");
            for card in cards {
                let mark = if card.selected { "x" } else { " " };
                let _ = writeln!(out, "  [{mark}] {} by {}", card.name, card.brand);
                let _ = writeln!(out, "      {}", card.description);
            }
            out
        }
    }
}

pub fn panel(view: &SelectionPanel) -> String {
    match view {
        SelectionPanel::Empty(text) => format!("[selected] {text}\n"),
        SelectionPanel::Items(entries) => {
            let mut out = String::from("[selected]\n");
            for entry in entries {
                let _ = writeln!(out, "  {}. {}  (remove {})", entry.index, entry.name, entry.index);
            }
            if view.offers_clear_all() {
                out.push_str("  (clear to remove all)\n");
            }
            out
        }
    }
}

pub fn chat(view: &ChatView) -> String {
    match view {
        ChatView::Placeholder(text) => format!("[chat] {text}\n"),
        ChatView::Loading(text) => format!("[chat] {text}\n"),
        ChatView::Error(message) => format!("[chat] Error: {message}\n"),
        ChatView::Transcript(messages) => {
            let mut out = String::from("[chat]\n");
            for message in messages {
                let _ = writeln!(out, "{}: {}", message.speaker(), message.content);
            }
            out
        }
    }
}

pub fn views(views: &SessionViews) -> String {
    format!(
        "{}{}{}",
        grid(&views.grid),
        panel(&views.panel),
        chat(&views.chat)
    )
}

pub fn event(event: &AdvisorEvent) -> String {
    match event {
        AdvisorEvent::GridRendered(view) => grid(view),
        AdvisorEvent::SelectionChanged { grid: g, panel: p } => format!("{}{}", grid(g), panel(p)),
        AdvisorEvent::ChatRendered(view) => chat(view),
        AdvisorEvent::Error(err) => format!("error: {}\n", err.message),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
