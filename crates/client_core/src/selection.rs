//! The user's selected products, written through to local storage.

use std::sync::Arc;

use shared::domain::Product;
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, ClientResult},
    local_store::LocalStore,
};

pub const SELECTED_PRODUCTS_KEY: &str = "selectedProducts";
pub const CLEAR_ALL_CONFIRMATION: &str =
    "Are you sure you want to remove all selected products? This cannot be undone.";

/// Blocking yes/no question put to the user before a destructive action.
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

pub struct SelectionStore {
    products: Vec<Product>,
    store: Arc<dyn LocalStore>,
}

impl SelectionStore {
    /// Hydrates from storage. An unreadable stored value starts an empty
    /// selection; a failing store is an error.
    pub async fn restore(store: Arc<dyn LocalStore>) -> ClientResult<Self> {
        let raw = store
            .get_item(SELECTED_PRODUCTS_KEY)
            .await
            .map_err(ClientError::Storage)?;

        let products = match raw {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Product>>(&raw) {
                Ok(stored) => dedupe_by_name(stored),
                Err(err) => {
                    warn!(error = %err, "discarding unreadable stored selection");
                    Vec::new()
                }
            },
        };

        info!(selected = products.len(), "selection restored");
        Ok(Self { products, store })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.products.iter().any(|product| product.name == name)
    }

    pub async fn toggle(&mut self, product: &Product) -> ClientResult<ToggleOutcome> {
        let mut next = self.products.clone();
        let outcome = match next.iter().position(|p| p.same_identity(product)) {
            Some(index) => {
                next.remove(index);
                ToggleOutcome::Removed
            }
            None => {
                next.push(product.clone());
                ToggleOutcome::Added
            }
        };
        self.commit(next).await?;
        debug!(product = %product.name, ?outcome, "toggled selection");
        Ok(outcome)
    }

    /// Removes by display position. An index past the end changes nothing and
    /// writes nothing.
    pub async fn remove_at(&mut self, index: usize) -> ClientResult<Option<Product>> {
        if index >= self.products.len() {
            debug!(index, len = self.products.len(), "ignoring out-of-range removal");
            return Ok(None);
        }

        let mut next = self.products.clone();
        let removed = next.remove(index);
        self.commit(next).await?;
        Ok(Some(removed))
    }

    /// Returns `false` when the user declined.
    pub async fn clear_all(&mut self, prompt: &dyn ConfirmPrompt) -> ClientResult<bool> {
        if !prompt.confirm(CLEAR_ALL_CONFIRMATION) {
            return Ok(false);
        }
        self.commit(Vec::new()).await?;
        info!("selection cleared");
        Ok(true)
    }

    // Memory only changes after the write succeeded.
    async fn commit(&mut self, next: Vec<Product>) -> ClientResult<()> {
        let encoded = serde_json::to_string(&next).map_err(|source| ClientError::Parse {
            what: "selection",
            source,
        })?;
        self.store
            .set_item(SELECTED_PRODUCTS_KEY, &encoded)
            .await
            .map_err(ClientError::Storage)?;
        self.products = next;
        Ok(())
    }
}

fn dedupe_by_name(stored: Vec<Product>) -> Vec<Product> {
    let mut products: Vec<Product> = Vec::with_capacity(stored.len());
    for product in stored {
        if !products.iter().any(|p| p.same_identity(&product)) {
            products.push(product);
        }
    }
    products
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
