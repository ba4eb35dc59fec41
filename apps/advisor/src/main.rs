mod commands;
mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    AdvisorSession, CatalogLoader, CatalogSource, HttpCompletionClient, LocalStore, MemoryStore,
};
use storage::Storage;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{is_affirmative, parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Browse the product catalog and chat about a routine")]
struct Args {
    /// TOML settings file; `advisor.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Catalog file path or http(s) URL.
    #[arg(long)]
    catalog: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    completion_url: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// Keep the selection in memory only.
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(catalog) = args.catalog {
        settings.catalog = catalog;
    }
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }
    if let Some(completion_url) = args.completion_url {
        settings.completion_url = completion_url;
    }
    if let Some(model) = args.model {
        settings.model = model;
    }

    let store: Arc<dyn LocalStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let database_url = config::normalize_database_url(&settings.database_url);
        let storage = Storage::new(&database_url)
            .await
            .with_context(|| format!("opening selection store at {database_url}"))?;
        Arc::new(storage)
    };

    let catalog = CatalogLoader::new(CatalogSource::parse(&settings.catalog)?);
    let backend = Arc::new(HttpCompletionClient::new(settings.endpoint_settings()?)?);
    let session = AdvisorSession::start(catalog, store, backend, settings.chat_options()).await?;
    info!(model = %settings.model, "advisor ready");

    let mut events = session.subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print!("{}", render::event(&event)),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    print!("{}", render::views(&session.current_views().await));
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        if !dispatch(&session, command, &mut lines).await? {
            break;
        }
    }
    Ok(())
}

/// Runs one command. Returns `false` when the user asked to leave.
async fn dispatch(
    session: &Arc<AdvisorSession>,
    command: Command,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    // Failures from the session are already shown through the error event.
    match command {
        Command::Categories => {
            if let Ok(categories) = session.categories().await {
                println!("categories: {}", categories.join(", "));
            }
        }
        Command::SelectCategory { category } => {
            let _ = session.select_category(&category).await;
        }
        Command::Toggle { product_name } => {
            let _ = session.toggle_product(&product_name).await;
        }
        Command::Remove { index } => {
            if let Ok(None) = session.remove_selected(index).await {
                println!("nothing selected at {index}");
            }
        }
        Command::ClearAll => {
            println!("{} [y/N]", client_core::selection::CLEAR_ALL_CONFIRMATION);
            let yes = lines.next_line().await?.is_some_and(|answer| is_affirmative(&answer));
            let _ = session.clear_selection(&move |_: &str| yes).await;
        }
        Command::GenerateRoutine => {
            let session = Arc::clone(session);
            tokio::spawn(async move {
                session.generate_routine().await;
            });
        }
        Command::Ask { text } => {
            let session = Arc::clone(session);
            tokio::spawn(async move {
                session.ask_follow_up(&text).await;
            });
        }
        Command::Show => {
            if let Some(category) = session.current_category().await {
                println!("category: {category}");
            }
            print!("{}", render::views(&session.current_views().await));
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {
            if session.is_awaiting_reply() {
                warn!("leaving with a chat reply still outstanding");
            }
            return Ok(false);
        }
    }
    Ok(true)
}
