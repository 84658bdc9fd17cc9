//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a store from `USERSTORE_*` environment configuration, or an
//!   in-memory store when no database path is set.
//! - Run one create → get → list → update → delete cycle and print each
//!   aggregate as JSON.

use log::info;
use std::error::Error;
use std::process::ExitCode;
use userstore_core::config::ENV_DB_PATH;
use userstore_core::{
    default_log_level, init_logging, NewUser, PageFilter, StoreConfig, UserStorage, UserStore,
    UserType, UserUpdate,
};

const ENV_LOG_DIR: &str = "USERSTORE_LOG_DIR";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("userstore_cli failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("userstore_core version={}", userstore_core::core_version());

    if let Ok(log_dir) = std::env::var(ENV_LOG_DIR) {
        init_logging(default_log_level(), &log_dir)?;
    }

    let store = if std::env::var_os(ENV_DB_PATH).is_some() {
        let config = StoreConfig::from_env()?;
        println!("database={}", config.database_path.display());
        UserStore::open(&config)?
    } else {
        println!("database=:memory:");
        UserStore::open_in_memory()?
    };

    let created = store.create_user(
        &NewUser::new("Alice", 30, UserType::Employee)
            .with_item("Laptop")
            .with_item("Badge"),
    )?;
    println!("created={}", serde_json::to_string(&created)?);

    let loaded = store.get_user(created.id)?;
    println!("loaded={}", serde_json::to_string(&loaded)?);

    let page = store.list_users(&PageFilter::new(1, 10))?;
    println!("listed={}", page.len());

    let mut update = UserUpdate::new(created.id, "Alice Smith", 31, UserType::Contractor);
    if let Some(first) = created.items.first() {
        update = update.with_item(first.id, "Laptop Pro");
    }
    let updated = store.update_user(&update)?;
    println!("updated={}", serde_json::to_string(&updated)?);

    store.delete_user(created.id)?;
    println!("deleted={}", created.id);

    info!(
        "event=smoke_run module=cli status=ok user_id={}",
        created.id
    );
    store.close();
    Ok(())
}
