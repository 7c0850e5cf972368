//! guidecache CLI - sync, inspect and maintain the local event-guide cache.

use std::io;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use guidecache::api::ApiClient;
use guidecache::config::Config;
use guidecache::prefs::Prefs;
use guidecache::push::PushMessage;
use guidecache::store::{archive, RecordStore};
use guidecache::sync::{runner, SyncEngine, Table};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() -> ! {
    eprintln!("Usage: guidecache <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  sync                 run one sync cycle against the backend");
    eprintln!("  purge                delete cached records and reset sync timestamps");
    eprintln!("  archive              export the record store into a single archive file");
    eprintln!("  show <kind>          print cached records (agenda|sponsors|floors|");
    eprintln!("                       coordinates|notifications|surveys)");
    eprintln!("  notify <id> <text>   store a notification as if pushed");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("sync");

    let config = Config::load()?;
    let store = RecordStore::new(config.storage_dir()?)?;
    let prefs = Prefs::load(config.prefs_path()?);

    match command {
        "sync" => {
            let client = ApiClient::new(config.base_url.clone())?;
            let (events_tx, mut events_rx) = mpsc::unbounded_channel();
            let mut engine = SyncEngine::new(store, prefs, &config, events_tx);

            runner::run_cycle(&mut engine, &client).await;
            runner::check_push_registration(&mut engine, &client).await;
            runner::process_events(&engine, &client, &mut events_rx).await;
            info!("Sync cycle finished");
        }
        "purge" => {
            store.purge();
            let mut prefs = prefs;
            for table in Table::SYNCED {
                prefs.remove(table.prefs_key());
            }
            info!("Cache purged");
        }
        "archive" => {
            let dest = std::env::current_dir()?;
            let path = archive::export(&store, &dest)?;
            println!("{}", path.display());
        }
        "show" => {
            let kind = args.get(2).map(String::as_str).unwrap_or_else(|| usage());
            show(&store, kind);
        }
        "notify" => {
            let (Some(id), Some(text)) = (args.get(2), args.get(3)) else {
                usage();
            };
            let (events_tx, _events_rx) = mpsc::unbounded_channel();
            let engine = SyncEngine::new(store, prefs, &config, events_tx);
            engine.handle_push_message(
                PushMessage {
                    id: id.clone(),
                    message: text.clone(),
                },
                runner::now_ms(),
            );
            info!(id = %id, "Notification stored");
        }
        _ => usage(),
    }

    Ok(())
}

fn show(store: &RecordStore, kind: &str) {
    match kind {
        "agenda" => {
            let load = store.load_agenda();
            for item in &load.items {
                println!("{}  {}  [{}]", item.id, item.title, item.category_name);
            }
            println!("{} items, latest update {}", load.items.len(), load.latest_updated);
        }
        "sponsors" => {
            for sponsor in store.load_sponsors() {
                println!("{}  {}  [{}]", sponsor.id, sponsor.name, sponsor.category_name);
            }
        }
        "floors" => {
            for floor in store.load_floors() {
                println!("{}  pos={}  {}", floor.id, floor.position, floor.image_url);
            }
        }
        "coordinates" => {
            for coords in store.load_coordinates() {
                println!(
                    "{}  pos={}  {:.5},{:.5}",
                    coords.id, coords.position, coords.latitude, coords.longitude
                );
            }
        }
        "notifications" => {
            for notification in store.load_notifications() {
                println!("{}  {}", notification.id, notification.message);
            }
        }
        "surveys" => {
            for survey in store.load_surveys() {
                println!(
                    "{}  {}  ({} questions)",
                    survey.id,
                    survey.title,
                    survey.question_ids.len()
                );
            }
        }
        _ => usage(),
    }
}
