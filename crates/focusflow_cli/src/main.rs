//! CLI entry point for linkage checks and offline maintenance.
//!
//! # Responsibility
//! - Without arguments: print core ping/version.
//! - With `<db_path> [config.json]`: rehydrate the task database, run the
//!   startup sweep, persist the result and print a stats summary.

use focusflow_core::db::open_db;
use focusflow_core::logging::init_logging_from_config;
use focusflow_core::{
    Category, CoreConfig, InMemoryTaskRepository, SqliteSnapshotStore, SystemClock, TaskService,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("focusflow_core ping={}", focusflow_core::ping());
    println!("focusflow_core version={}", focusflow_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next().map(PathBuf::from) else {
        return ExitCode::SUCCESS;
    };
    let config_path = args.next().map(PathBuf::from);

    match run_maintenance(db_path, config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("focusflow maintenance failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_maintenance(
    db_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let config = match config_path {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config)?;

    let conn = open_db(&db_path)?;
    let store = SqliteSnapshotStore::new(&conn);
    let mut service =
        TaskService::with_config(InMemoryTaskRepository::new(), SystemClock, &config);

    let repaired = service.load_from(&store)?;
    let loaded = service.snapshot().len();
    let stats = service.startup();
    service.save_to(&store)?;
    let expired = loaded - service.snapshot().len();
    info!(
        "event=cli_maintenance module=cli status=ok loaded={loaded} repaired={repaired} expired={expired}"
    );

    println!("tasks loaded={loaded} repaired={repaired} expired={expired}");
    println!(
        "today created={} classified={} completed={}",
        stats.daily.created, stats.daily.classified, stats.daily.completed
    );
    println!(
        "week total={} completed={} completion_rate={:.2}",
        stats.weekly.total, stats.weekly.completed, stats.weekly.completion_rate
    );
    for category in Category::CLASSIFIED {
        let active = service.list_by_category(category);
        let top_executing = active.first().is_some_and(|task| task.is_executing);
        println!(
            "{category}: active={} top_executing={top_executing}",
            active.len()
        );
    }
    if let Some(executing) = service.list_executing() {
        println!("executing category={}", executing.category);
    }
    println!("sweep_interval_secs={}", config.sweep_interval().as_secs());
    Ok(())
}
