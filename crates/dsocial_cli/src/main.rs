//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `dsocial_core` linkage from a plain executable.
//! - Confirm the configured message database opens and report its size.
//! - Start file logging at the build's default level when `DSOCIAL_LOG_DIR`
//!   is set.

use dsocial_core::db::open_db;
use dsocial_core::{
    default_log_level, init_logging, Message, MessageStore, SqliteDurableMap, StoreConfig,
    MESSAGES_MAP,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("dsocial_core ping={}", dsocial_core::ping());
    println!("dsocial_core version={}", dsocial_core::core_version());

    let config = StoreConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        let level = default_log_level();
        match init_logging(level.as_str(), &log_dir.to_string_lossy()) {
            Ok(()) => println!("dsocial_core log_dir={} level={level}", log_dir.display()),
            Err(err) => eprintln!("dsocial_core logging disabled: {err}"),
        }
    }
    let db_path = config.resolved_db_path();
    println!("dsocial_core db_path={}", db_path.display());

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("dsocial_core db_open failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let count = SqliteDurableMap::<Message>::try_new(&conn, MESSAGES_MAP, config.bounds)
        .and_then(|map| MessageStore::new(map).message_count());
    match count {
        Ok(count) => {
            println!("dsocial_core messages={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("dsocial_core message_count failed: {err}");
            ExitCode::FAILURE
        }
    }
}
