//! View models for the product grid, the selected-products panel and the chat
//! window. Every render produces a complete view; nothing is diffed.

use shared::{
    domain::Product,
    protocol::{ChatRole, ChatTurn},
};

use crate::selection::SelectionStore;

pub const GRID_PLACEHOLDER: &str = "Select a category to view products";
pub const PANEL_PLACEHOLDER: &str = "No products selected yet.";
pub const NO_DESCRIPTION: &str = "No description available.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub name: String,
    pub brand: String,
    pub image: String,
    pub description: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridView {
    Placeholder(String),
    Cards(Vec<ProductCard>),
}

impl GridView {
    pub fn cards(&self) -> &[ProductCard] {
        match self {
            Self::Placeholder(_) => &[],
            Self::Cards(cards) => cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEntry {
    /// Position passed back to `remove_selected`.
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPanel {
    Empty(String),
    Items(Vec<PanelEntry>),
}

impl SelectionPanel {
    pub fn offers_clear_all(&self) -> bool {
        matches!(self, Self::Items(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessageView {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessageView {
    pub fn speaker(&self) -> &'static str {
        match self.role {
            ChatRole::User => "You",
            ChatRole::Assistant | ChatRole::System => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatView {
    /// Guidance or idle text shown instead of a transcript.
    Placeholder(String),
    Loading(String),
    Transcript(Vec<ChatMessageView>),
    Error(String),
}

impl Default for ChatView {
    fn default() -> Self {
        Self::Transcript(Vec::new())
    }
}

/// `visible` is `None` until a category has been chosen.
pub fn render_grid(visible: Option<&[Product]>, selection: &SelectionStore) -> GridView {
    let Some(products) = visible else {
        return GridView::Placeholder(GRID_PLACEHOLDER.to_string());
    };

    GridView::Cards(
        products
            .iter()
            .map(|product| ProductCard {
                name: product.name.clone(),
                brand: product.brand.clone(),
                image: product.image.clone(),
                description: product
                    .description
                    .clone()
                    .filter(|description| !description.is_empty())
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                selected: selection.contains(&product.name),
            })
            .collect(),
    )
}

pub fn render_panel(selection: &SelectionStore) -> SelectionPanel {
    if selection.is_empty() {
        return SelectionPanel::Empty(PANEL_PLACEHOLDER.to_string());
    }

    SelectionPanel::Items(
        selection
            .products()
            .iter()
            .enumerate()
            .map(|(index, product)| PanelEntry {
                index,
                name: product.name.clone(),
            })
            .collect(),
    )
}

pub fn render_transcript(turns: &[ChatTurn]) -> ChatView {
    ChatView::Transcript(
        turns
            .iter()
            .map(|turn| ChatMessageView {
                role: turn.role,
                content: turn.content.clone(),
            })
            .collect(),
    )
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
