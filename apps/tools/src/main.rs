use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    catalog::{categories, filter_by_category},
    selection::SELECTED_PRODUCTS_KEY,
    CatalogLoader, CatalogSource,
};
use shared::domain::Product;
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/advisor.db")]
    database_url: String,
    #[arg(long, default_value = client_core::catalog::DEFAULT_CATALOG_SOURCE)]
    catalog: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the categories found in the catalog.
    Categories,
    /// List catalog products, optionally for one category.
    Products {
        #[arg(long)]
        category: Option<String>,
    },
    /// Print the persisted selection.
    ShowSelection,
    /// Forget the persisted selection.
    ResetSelection,
    /// List every key held by the local store.
    Keys,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Categories => {
            for category in categories(&load_catalog(&cli.catalog).await?) {
                println!("{category}");
            }
        }
        Command::Products { category } => {
            let products = load_catalog(&cli.catalog).await?;
            let products = match category {
                Some(category) => filter_by_category(&products, &category),
                None => products,
            };
            for product in products {
                println!("{}\t{}\t{}", product.category, product.brand, product.name);
            }
        }
        Command::ShowSelection => {
            let storage = open_storage(&cli.database_url).await?;
            match storage.load_item(SELECTED_PRODUCTS_KEY).await? {
                Some(item) => {
                    let products: Vec<Product> = serde_json::from_str(&item.value)
                        .context("stored selection is not a product list")?;
                    println!("updated {}", item.updated_at.to_rfc3339());
                    for (index, product) in products.iter().enumerate() {
                        println!("{index}\t{}\t{}", product.brand, product.name);
                    }
                }
                None => println!("no selection stored"),
            }
        }
        Command::ResetSelection => {
            let storage = open_storage(&cli.database_url).await?;
            if storage.remove_item(SELECTED_PRODUCTS_KEY).await? {
                println!("selection removed");
            } else {
                println!("no selection stored");
            }
        }
        Command::Keys => {
            let storage = open_storage(&cli.database_url).await?;
            for key in storage.keys().await? {
                println!("{key}");
            }
        }
    }

    Ok(())
}

async fn load_catalog(source: &str) -> Result<Vec<Product>> {
    let loader = CatalogLoader::new(CatalogSource::parse(source)?);
    Ok(loader.load_catalog().await?)
}

async fn open_storage(database_url: &str) -> Result<Storage> {
    let storage = Storage::new(database_url)
        .await
        .with_context(|| format!("opening {database_url}"))?;
    storage.health_check().await?;
    Ok(storage)
}
