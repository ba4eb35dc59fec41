//! Session-scoped owner of catalog display, selection and chat state. Each
//! public method is the handler for one user command.

use std::sync::Arc;

use shared::{domain::Product, error::AdvisorError};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    catalog::{categories, filter_by_category, CatalogLoader},
    chat::{ChatOptions, ChatSession},
    completion::CompletionBackend,
    error::{ClientError, ClientResult},
    events::AdvisorEvent,
    local_store::LocalStore,
    selection::{ConfirmPrompt, SelectionStore, ToggleOutcome},
    views::{render_grid, render_panel, ChatView, GridView, SelectionPanel},
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct CatalogDisplay {
    category: Option<String>,
    /// `None` until a category has been chosen.
    visible: Option<Vec<Product>>,
}

#[derive(Debug, Clone)]
pub struct SessionViews {
    pub grid: GridView,
    pub panel: SelectionPanel,
    pub chat: ChatView,
}

pub struct AdvisorSession {
    catalog: CatalogLoader,
    // Lock order: display before selection.
    display: Mutex<CatalogDisplay>,
    selection: Mutex<SelectionStore>,
    chat: ChatSession,
    events: broadcast::Sender<AdvisorEvent>,
}

impl AdvisorSession {
    /// Restores the stored selection and wires the chat session.
    pub async fn start(
        catalog: CatalogLoader,
        store: Arc<dyn LocalStore>,
        backend: Arc<dyn CompletionBackend>,
        chat_options: ChatOptions,
    ) -> ClientResult<Arc<Self>> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let selection = SelectionStore::restore(store).await?;
        let chat = ChatSession::new(backend, chat_options, events.clone());
        info!(source = ?catalog.source(), "advisor session started");
        Ok(Arc::new(Self {
            catalog,
            display: Mutex::new(CatalogDisplay::default()),
            selection: Mutex::new(selection),
            chat,
            events,
        }))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AdvisorEvent> {
        self.events.subscribe()
    }

    pub async fn categories(&self) -> ClientResult<Vec<String>> {
        let products = self.catalog.load_catalog().await.map_err(|err| self.report(err))?;
        Ok(categories(&products))
    }

    pub async fn current_category(&self) -> Option<String> {
        self.display.lock().await.category.clone()
    }

    /// Loads the catalog afresh and shows the products of `category`.
    pub async fn select_category(&self, category: &str) -> ClientResult<GridView> {
        let products = self.catalog.load_catalog().await.map_err(|err| self.report(err))?;
        let visible = filter_by_category(&products, category);

        let mut display = self.display.lock().await;
        display.category = Some(category.to_string());
        display.visible = Some(visible);

        let selection = self.selection.lock().await;
        let grid = render_grid(display.visible.as_deref(), &selection);
        let _ = self.events.send(AdvisorEvent::GridRendered(grid.clone()));
        Ok(grid)
    }

    /// Toggles a product currently shown in the grid.
    pub async fn toggle_product(&self, name: &str) -> ClientResult<ToggleOutcome> {
        let display = self.display.lock().await;
        let product = display
            .visible
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|product| product.name == name)
            .cloned()
            .ok_or_else(|| {
                self.report(ClientError::Validation(format!(
                    "'{name}' is not among the displayed products"
                )))
            })?;

        let mut selection = self.selection.lock().await;
        let outcome = selection
            .toggle(&product)
            .await
            .map_err(|err| self.report(err))?;
        self.publish_selection(&display, &selection);
        Ok(outcome)
    }

    pub async fn remove_selected(&self, index: usize) -> ClientResult<Option<Product>> {
        let display = self.display.lock().await;
        let mut selection = self.selection.lock().await;
        let removed = selection
            .remove_at(index)
            .await
            .map_err(|err| self.report(err))?;
        if removed.is_some() {
            self.publish_selection(&display, &selection);
        }
        Ok(removed)
    }

    pub async fn clear_selection(&self, prompt: &dyn ConfirmPrompt) -> ClientResult<bool> {
        let display = self.display.lock().await;
        let mut selection = self.selection.lock().await;
        let cleared = selection
            .clear_all(prompt)
            .await
            .map_err(|err| self.report(err))?;
        if cleared {
            self.publish_selection(&display, &selection);
        } else {
            debug!("clear-all declined");
        }
        Ok(cleared)
    }

    pub async fn selected_products(&self) -> Vec<Product> {
        self.selection.lock().await.products().to_vec()
    }

    /// Works on a snapshot; toggles made while the request is out do not
    /// change the routine being generated.
    pub async fn generate_routine(&self) -> ChatView {
        let snapshot = self.selected_products().await;
        self.chat.start_routine(&snapshot).await
    }

    pub async fn ask_follow_up(&self, text: &str) -> Option<ChatView> {
        self.chat.ask_follow_up(text).await
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.chat.is_awaiting_reply()
    }

    pub async fn current_views(&self) -> SessionViews {
        let display = self.display.lock().await;
        let selection = self.selection.lock().await;
        SessionViews {
            grid: render_grid(display.visible.as_deref(), &selection),
            panel: render_panel(&selection),
            chat: self.chat.current_view().await,
        }
    }

    fn publish_selection(&self, display: &CatalogDisplay, selection: &SelectionStore) {
        let _ = self.events.send(AdvisorEvent::SelectionChanged {
            grid: render_grid(display.visible.as_deref(), selection),
            panel: render_panel(selection),
        });
    }

    fn report(&self, err: ClientError) -> ClientError {
        let _ = self
            .events
            .send(AdvisorEvent::Error(AdvisorError::from(&err)));
        err
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
