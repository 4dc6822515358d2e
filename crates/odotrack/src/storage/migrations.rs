//! Schema versioning for the odotrack database.
//!
//! Migrations are an ordered list of SQL steps. Each pending step runs in its
//! own transaction together with the version bump, so a crash mid-upgrade
//! leaves the database at the last completed version.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_METADATA_TABLE, CREATE_SLOTS_TABLE};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Ordered migrations; the version reached after step `i` is `i + 1`.
const MIGRATIONS: &[&str] = &[CREATE_SLOTS_TABLE];

/// The schema version this build expects.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const CURRENT_VERSION: i32 = MIGRATIONS.len() as i32;

/// Bring the database schema up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if the stored version is unreadable, newer than this
/// build, or a migration step fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for (target, statement) in (1..).zip(MIGRATIONS.iter()).skip_while(|(v, _)| *v <= version) {
        debug!("Applying schema migration {}", target);
        let tx = conn.unchecked_transaction()?;
        tx.execute(statement, [])?;
        set_schema_version(&tx, target)?;
        tx.commit()?;
    }

    if version < CURRENT_VERSION {
        info!(
            "Database schema upgraded from version {} to {}",
            version, CURRENT_VERSION
        );
    }
    Ok(())
}

/// Read the stored schema version; 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
