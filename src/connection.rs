use rusqlite::{Connection, OpenFlags};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Opens the configured database.
///
/// No path, an empty path or `:memory:` give a transient in-memory database.
/// Foreign keys are switched on for every connection so deletes honour the
/// schema's `ON DELETE` clauses.
pub fn open(config: &DatabaseConfig) -> Result<Connection> {
    let connection = match config.path.as_deref() {
        None | Some("") | Some(":memory:") => {
            tracing::info!("opening transient in-memory database");
            Connection::open_in_memory()?
        }
        Some(path) => {
            let mut flags = OpenFlags::default();
            if config.read_only {
                flags.remove(OpenFlags::SQLITE_OPEN_CREATE);
                flags.remove(OpenFlags::SQLITE_OPEN_READ_WRITE);
                flags.insert(OpenFlags::SQLITE_OPEN_READ_ONLY);
            }
            if config.no_follow {
                flags.insert(OpenFlags::SQLITE_OPEN_NOFOLLOW);
            }
            tracing::info!(path, read_only = config.read_only, "opening database");
            Connection::open_with_flags(path, flags)?
        }
    };
    connection.pragma_update(None, "foreign_keys", true)?;
    Ok(connection)
}

pub fn is_in_memory(config: &DatabaseConfig) -> bool {
    matches!(config.path.as_deref(), None | Some("") | Some(":memory:"))
}
