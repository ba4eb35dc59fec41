use shared::error::AdvisorError;

use crate::views::{ChatView, GridView, SelectionPanel};

/// Published by `AdvisorSession` whenever a view must be redrawn.
#[derive(Debug, Clone)]
pub enum AdvisorEvent {
    GridRendered(GridView),
    /// Grid highlight and panel always change together.
    SelectionChanged {
        grid: GridView,
        panel: SelectionPanel,
    },
    ChatRendered(ChatView),
    Error(AdvisorError),
}
