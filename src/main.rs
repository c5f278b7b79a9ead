use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crmsync::auth::AuthClient;
use crmsync::config::Config;
use crmsync::crm::CrmStores;
use crmsync::session::Session;
use crmsync::storage::{DeviceStorage, SqliteStorage};
use crmsync::sync::{Context, Entity, Patch, Store};

#[derive(Parser, Debug)]
#[command(name = "crmsync")]
#[command(about = "Synchronize CRM records with the backend or a local demo store")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/crmsync/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sign in and store the bearer token
  Login { email: String, password: String },
  /// Create an account and sign in
  Register {
    name: String,
    email: String,
    password: String,
  },
  /// Clear the stored session
  Logout,
  /// Switch demo mode: records are kept on this device only
  Demo { state: Toggle },
  /// List the records of a collection as JSON lines
  List { collection: String },
  /// Add a record from a JSON object
  Add { collection: String, json: String },
  /// Apply a partial update from a JSON object
  Update {
    collection: String,
    id: i64,
    json: String,
  },
  /// Delete a record
  Delete { collection: String, id: i64 },
  /// Show the activity feed, newest first
  Activity,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Toggle {
  On,
  Off,
}

/// Resolve a collection name to its typed store.
macro_rules! with_store {
  ($stores:expr, $collection:expr, |$store:ident| $body:expr) => {
    match $collection.as_str() {
      "contacts" => {
        let $store = &$stores.contacts;
        $body
      }
      "leads" => {
        let $store = &$stores.leads;
        $body
      }
      "deals" => {
        let $store = &$stores.deals;
        $body
      }
      "tasks" => {
        let $store = &$stores.tasks;
        $body
      }
      "products" => {
        let $store = &$stores.products;
        $body
      }
      "categories" => {
        let $store = &$stores.categories;
        $body
      }
      "employees" => {
        let $store = &$stores.employees;
        $body
      }
      other => Err(eyre!("Unknown collection: {}", other)),
    }
  };
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;

  let storage: Arc<dyn DeviceStorage> = match &config.storage_path {
    Some(path) => Arc::new(SqliteStorage::open_at(path)?),
    None => Arc::new(SqliteStorage::open()?),
  };
  let session = Session::new(storage);
  let ctx = Context::new(session.clone(), &config.backend.url)?;

  match args.command {
    Command::Login { email, password } => {
      let user = AuthClient::new(&ctx).login(&email, &password).await?;
      println!("Signed in as {} <{}>", user.name, user.email);
    }
    Command::Register {
      name,
      email,
      password,
    } => {
      let user = AuthClient::new(&ctx).register(&name, &email, &password).await?;
      println!("Registered {} <{}>", user.name, user.email);
    }
    Command::Logout => {
      AuthClient::new(&ctx).logout()?;
      println!("Signed out");
    }
    Command::Demo { state } => {
      session.set_demo(matches!(state, Toggle::On))?;
      match state {
        Toggle::On => println!("Demo mode on: records stay on this device"),
        Toggle::Off => println!("Demo mode off"),
      }
    }
    Command::List { collection } => {
      let stores = CrmStores::new(&ctx);
      with_store!(stores, collection, |store| list_records(store).await)?;
    }
    Command::Add { collection, json } => {
      let stores = CrmStores::new(&ctx);
      with_store!(stores, collection, |store| add_record(store, &json).await)?;
    }
    Command::Update {
      collection,
      id,
      json,
    } => {
      let stores = CrmStores::new(&ctx);
      with_store!(stores, collection, |store| update_record(store, id, &json)
        .await)?;
    }
    Command::Delete { collection, id } => {
      let stores = CrmStores::new(&ctx);
      with_store!(stores, collection, |store| store.delete(id).await)?;
    }
    Command::Activity => {
      let stores = CrmStores::new(&ctx);
      stores.activities.fetch_all().await?;
      for activity in stores.activities.activities() {
        println!("{}", serde_json::to_string(&activity)?);
      }
    }
  }

  Ok(())
}

async fn list_records<E: Entity>(store: &Store<E>) -> Result<()> {
  store.fetch_all().await?;
  for record in store.records() {
    println!("{}", serde_json::to_string(&record)?);
  }
  Ok(())
}

async fn add_record<E: Entity>(store: &Store<E>, json: &str) -> Result<()> {
  let draft: E = serde_json::from_str(json).map_err(|e| eyre!("Invalid record JSON: {}", e))?;
  let created = store.add(draft).await?;
  println!("{}", serde_json::to_string(&created)?);
  Ok(())
}

async fn update_record<E: Entity>(store: &Store<E>, id: i64, json: &str) -> Result<()> {
  let patch: Patch = serde_json::from_str(json).map_err(|e| eyre!("Invalid patch JSON: {}", e))?;
  store.fetch_all().await?;
  store.update(id, patch).await
}
