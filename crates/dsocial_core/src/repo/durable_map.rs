//! Durable key-value map contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/insert/remove/values over string keys with serde values.
//! - Keep SQL details and value encoding inside the persistence boundary.
//!
//! # Invariants
//! - Every call commits before returning; there is no explicit flush.
//! - `insert` enforces the value bound on every write and the key bound when
//!   a new key is created. Reads, overwrites and removals of keys written
//!   under a larger bound keep working.
//! - `values` yields entries in ascending key order.
//! - Read paths reject undecodable persisted values instead of skipping them.

use crate::config::MapBounds;
use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

const MAP_ENTRIES_TABLE: &str = "map_entries";
const MAP_ENTRIES_COLUMNS: [&str; 3] = ["map_name", "key", "value"];

pub type MapResult<T> = Result<T, MapError>;

/// Failure raised by durable map operations.
#[derive(Debug)]
pub enum MapError {
    Db(DbError),
    KeyTooLarge {
        key_bytes: usize,
        max_key_bytes: usize,
    },
    ValueTooLarge {
        key: String,
        value_bytes: usize,
        max_value_bytes: usize,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::KeyTooLarge {
                key_bytes,
                max_key_bytes,
            } => write!(
                f,
                "map key is {key_bytes} bytes, exceeding the {max_key_bytes}-byte limit"
            ),
            Self::ValueTooLarge {
                key,
                value_bytes,
                max_value_bytes,
            } => write!(
                f,
                "encoded value for key `{key}` is {value_bytes} bytes, exceeding the {max_value_bytes}-byte limit"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted map data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for MapError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for MapError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistent map from string keys to values of type `V`.
pub trait DurableMap<V> {
    /// Returns the stored value, if any.
    fn get(&self, key: &str) -> MapResult<Option<V>>;
    /// Creates or overwrites `key`, returning the previous value.
    ///
    /// Key-size limits apply only when `key` is not stored yet.
    fn insert(&self, key: &str, value: &V) -> MapResult<Option<V>>;
    /// Deletes `key`, returning the removed value.
    fn remove(&self, key: &str) -> MapResult<Option<V>>;
    /// Returns every stored value in ascending key order.
    fn values(&self) -> MapResult<Vec<V>>;
    fn contains_key(&self, key: &str) -> MapResult<bool>;
    fn len(&self) -> MapResult<u64>;

    fn is_empty(&self) -> MapResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// One named map stored in the `map_entries` table.
///
/// Several maps with different names can share one database.
pub struct SqliteDurableMap<'conn, V> {
    conn: &'conn Connection,
    map_name: String,
    bounds: MapBounds,
    _value: PhantomData<fn() -> V>,
}

impl<'conn, V> SqliteDurableMap<'conn, V> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not what this binary expects.
    pub fn try_new(
        conn: &'conn Connection,
        map_name: impl Into<String>,
        bounds: MapBounds,
    ) -> MapResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            map_name: map_name.into(),
            bounds,
            _value: PhantomData,
        })
    }

    fn fits_key(&self, key: &str) -> bool {
        key.len() <= self.bounds.max_key_bytes
    }
}

impl<V> DurableMap<V> for SqliteDurableMap<'_, V>
where
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> MapResult<Option<V>> {
        let bytes: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT value FROM map_entries WHERE map_name = ?1 AND key = ?2;",
                params![self.map_name.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;

        bytes.map(|bytes| decode_value(key, &bytes)).transpose()
    }

    fn insert(&self, key: &str, value: &V) -> MapResult<Option<V>> {
        let encoded = serde_json::to_vec(value).map_err(|err| {
            MapError::InvalidData(format!("failed to encode value for key `{key}`: {err}"))
        })?;
        if encoded.len() > self.bounds.max_value_bytes {
            return Err(MapError::ValueTooLarge {
                key: key.to_string(),
                value_bytes: encoded.len(),
                max_value_bytes: self.bounds.max_value_bytes,
            });
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let previous: Option<Vec<u8>> = tx
            .query_row(
                "SELECT value FROM map_entries WHERE map_name = ?1 AND key = ?2;",
                params![self.map_name.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;
        if previous.is_none() && !self.fits_key(key) {
            return Err(MapError::KeyTooLarge {
                key_bytes: key.len(),
                max_key_bytes: self.bounds.max_key_bytes,
            });
        }
        tx.execute(
            "INSERT INTO map_entries (map_name, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (map_name, key) DO UPDATE SET value = excluded.value;",
            params![self.map_name.as_str(), key, encoded],
        )?;
        tx.commit()?;

        previous
            .map(|bytes| decode_value(key, &bytes))
            .transpose()
    }

    fn remove(&self, key: &str) -> MapResult<Option<V>> {
        let removed: Option<Vec<u8>> = self
            .conn
            .query_row(
                "DELETE FROM map_entries
                 WHERE map_name = ?1 AND key = ?2
                 RETURNING value;",
                params![self.map_name.as_str(), key],
                |row| row.get(0),
            )
            .optional()?;

        removed.map(|bytes| decode_value(key, &bytes)).transpose()
    }

    fn values(&self) -> MapResult<Vec<V>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value
             FROM map_entries
             WHERE map_name = ?1
             ORDER BY key ASC;",
        )?;
        let mut rows = stmt.query([self.map_name.as_str()])?;
        let mut values = Vec::new();

        while let Some(row) = rows.next()? {
            let key: String = row.get("key")?;
            let bytes: Vec<u8> = row.get("value")?;
            values.push(decode_value(&key, &bytes)?);
        }

        Ok(values)
    }

    fn contains_key(&self, key: &str) -> MapResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM map_entries WHERE map_name = ?1 AND key = ?2
            );",
            params![self.map_name.as_str(), key],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn len(&self) -> MapResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM map_entries WHERE map_name = ?1;",
            [self.map_name.as_str()],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| MapError::InvalidData(format!("negative entry count `{count}`")))
    }
}

fn decode_value<V: DeserializeOwned>(key: &str, bytes: &[u8]) -> MapResult<V> {
    serde_json::from_slice(bytes).map_err(|err| {
        MapError::InvalidData(format!("undecodable value for key `{key}`: {err}"))
    })
}

fn ensure_connection_ready(conn: &Connection) -> MapResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(MapError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, MAP_ENTRIES_TABLE)? {
        return Err(MapError::MissingRequiredTable(MAP_ENTRIES_TABLE));
    }

    for column in MAP_ENTRIES_COLUMNS {
        if !table_has_column(conn, MAP_ENTRIES_TABLE, column)? {
            return Err(MapError::MissingRequiredColumn {
                table: MAP_ENTRIES_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> MapResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> MapResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
