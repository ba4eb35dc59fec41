use serde::{Deserialize, Serialize};

/// A catalog entry. `name` is the identity key within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    pub fn same_identity(&self, other: &Product) -> bool {
        self.name == other.name
    }
}

/// Top-level shape of the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub products: Vec<Product>,
}

/// Reduced product shape handed to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineProduct {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
}

impl From<&Product> for RoutineProduct {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            description: product.description.clone().unwrap_or_default(),
        }
    }
}
