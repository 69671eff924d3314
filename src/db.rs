use std::fs;
use std::path::Path;
use std::sync::Mutex;

use chrono::{Local, NaiveDateTime};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, ToSql};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{NoticeError, Result};
use crate::models::{format_timestamp, LogEntry, MessageFilter, MessageTable, NewRecord, StoredMessage};
use crate::schema::{input_messages, message_columns, templates};

/// Name of the template seeded on first run
pub const DEFAULT_TEMPLATE_NAME: &str = "Default Pattern";

/// Text of the template seeded on first run
pub const DEFAULT_TEMPLATE_TEXT: &str = "🛑 *{activity} By {activist}*:-\n\
▪️ *Agenda:* {agenda}\n\
▪️ *Venue* : {venue}\n\
▪️ *Time* : {time}\n\
▪️ *Str* : {strength}";

/// Message store backed by a single SQLite connection.
///
/// Every call locks the connection, so a `Database` can be shared between
/// threads. After [`Database::close`] every call fails with
/// [`NoticeError::StoreClosed`].
pub struct Database {
    conn: Mutex<Option<Connection>>,
}

impl Database {
    /// Open (or create) the store file at `path`
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened message store");
        Self::from_connection(conn)
    }

    /// Open a store that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::run_migrations(&conn)?;
        Self::seed_templates(&conn)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create tables if they don't exist
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!("../migrations/2024-05-01-000000_create_tables/up.sql"))?;
        Ok(())
    }

    /// Insert the default template unless one with that name already exists
    fn seed_templates(conn: &Connection) -> Result<()> {
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?1, ?2)",
                templates::TABLE,
                templates::NAME,
                templates::TEXT
            ),
            params![DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE_TEXT],
        )?;

        if inserted > 0 {
            info!(name = DEFAULT_TEMPLATE_NAME, "Seeded default template");
        }

        Ok(())
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().map_err(|_| NoticeError::LockPoisoned)?;
        let conn = guard.as_ref().ok_or(NoticeError::StoreClosed)?;
        f(conn)
    }

    /// Append a record stamped with the current local time
    pub fn append(&self, record: &NewRecord) -> Result<i64> {
        self.append_at(record, Local::now().naive_local())
    }

    /// Append a record with an explicit timestamp
    pub fn append_at(&self, record: &NewRecord, timestamp: NaiveDateTime) -> Result<i64> {
        let stamp = format_timestamp(&timestamp);
        let table = record.table().table_name();

        self.with_connection(|conn| {
            match record {
                NewRecord::Input(input) => {
                    conn.execute(
                        &format!(
                            "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
                            table,
                            input_messages::MESSAGE,
                            input_messages::LANG,
                            input_messages::DISTRICT,
                            input_messages::CATEGORY,
                            input_messages::TIMESTAMP
                        ),
                        params![
                            input.message,
                            input.lang.as_str(),
                            input.district,
                            input.category.as_str(),
                            stamp
                        ],
                    )?;
                },
                NewRecord::Translated(tagged) | NewRecord::Converted(tagged) => {
                    conn.execute(
                        &format!(
                            "INSERT INTO {} ({}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4)",
                            table,
                            message_columns::MESSAGE,
                            message_columns::DISTRICT,
                            message_columns::CATEGORY,
                            message_columns::TIMESTAMP
                        ),
                        params![tagged.message, tagged.district, tagged.category.as_str(), stamp],
                    )?;
                },
            }

            let id = conn.last_insert_rowid();
            debug!(table, id, timestamp = %stamp, "Appended message");
            Ok(id)
        })
    }

    /// Messages and timestamps matching `filter`, newest first
    pub fn query(&self, table: MessageTable, filter: &MessageFilter) -> Result<Vec<LogEntry>> {
        Ok(self
            .records(table, filter)?
            .into_iter()
            .map(|record| LogEntry {
                message: record.message,
                timestamp: record.timestamp,
            })
            .collect())
    }

    /// Full rows matching `filter`, newest first
    pub fn records(&self, table: MessageTable, filter: &MessageFilter) -> Result<Vec<StoredMessage>> {
        let mut query = format!(
            "SELECT {}, {}, {}, {}, {} FROM {} WHERE 1=1",
            message_columns::ID,
            message_columns::MESSAGE,
            message_columns::DISTRICT,
            message_columns::CATEGORY,
            message_columns::TIMESTAMP,
            table.table_name()
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        // Apply filters if provided; empty strings mean "all"
        if let Some(date) = filter.date.as_deref().filter(|d| !d.is_empty()) {
            query.push_str(&format!(" AND substr({}, 1, ?) = ?", message_columns::TIMESTAMP));
            params.push(Box::new(i64::try_from(date.chars().count()).unwrap_or(i64::MAX)));
            params.push(Box::new(date.to_string()));
        }

        if let Some(district) = filter.district.as_deref().filter(|d| !d.is_empty()) {
            query.push_str(&format!(" AND {} = ?", message_columns::DISTRICT));
            params.push(Box::new(district.to_string()));
        }

        if let Some(category) = filter.category {
            query.push_str(&format!(" AND {} = ?", message_columns::CATEGORY));
            params.push(Box::new(category.as_str()));
        }

        query.push_str(&format!(
            " ORDER BY {} DESC, {} DESC",
            message_columns::TIMESTAMP,
            message_columns::ID
        ));

        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), Self::map_stored_message)?;

            let mut results = Vec::new();
            for row in rows {
                results.push(row?);
            }

            Ok(results)
        })
    }

    /// Number of rows in a message table
    pub fn count(&self, table: MessageTable) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", table.table_name()),
                [],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
    }

    /// Map a database row to a StoredMessage
    fn map_stored_message(row: &Row) -> rusqlite::Result<StoredMessage> {
        Ok(StoredMessage {
            id: row.get(message_columns::ID)?,
            message: row.get(message_columns::MESSAGE)?,
            district: row.get(message_columns::DISTRICT)?,
            category: row.get(message_columns::CATEGORY)?,
            timestamp: row.get(message_columns::TIMESTAMP)?,
        })
    }

    /// Template names in alphabetical order
    pub fn list_template_names(&self) -> Result<Vec<String>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {} ORDER BY {} ASC",
                templates::NAME,
                templates::TABLE,
                templates::NAME
            ))?;
            let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

            let mut results = Vec::new();
            for name in names {
                results.push(name?);
            }

            Ok(results)
        })
    }

    /// Template text, or an empty string if no template has this name
    pub fn get_template_text(&self, name: &str) -> Result<String> {
        self.with_connection(|conn| {
            let text: Option<String> = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM {} WHERE {} = ?1",
                        templates::TEXT,
                        templates::TABLE,
                        templates::NAME
                    ),
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(text.unwrap_or_default())
        })
    }

    /// Insert a new template. Returns `false` if the name is taken.
    pub fn create_template(&self, name: &str, text: &str) -> Result<bool> {
        self.with_connection(|conn| {
            let result = conn.execute(
                &format!(
                    "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
                    templates::TABLE,
                    templates::NAME,
                    templates::TEXT
                ),
                params![name, text],
            );

            match result {
                Ok(_) => {
                    info!(name, "Created template");
                    Ok(true)
                },
                Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                    warn!(name, "Template name already exists");
                    Ok(false)
                },
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Overwrite the text of an existing template. Returns `false` if no
    /// template has this name.
    pub fn update_template(&self, name: &str, text: &str) -> Result<bool> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE {} SET {} = ?1 WHERE {} = ?2",
                    templates::TABLE,
                    templates::TEXT,
                    templates::NAME
                ),
                params![text, name],
            )?;

            if changed == 0 {
                debug!(name, "No template to update");
            } else {
                info!(name, "Updated template");
            }

            Ok(changed > 0)
        })
    }

    /// Release the connection. Calling this again is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.conn.lock().map_err(|_| NoticeError::LockPoisoned)?;

        if let Some(conn) = guard.take() {
            if let Err((conn, err)) = conn.close() {
                *guard = Some(conn);
                return Err(err.into());
            }
            info!("Closed message store");
        }

        Ok(())
    }

    /// Whether [`Database::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.conn.lock().map_or(true, |guard| guard.is_none())
    }
}

/// Open the store at the configured path
pub fn establish_connection(config: &AppConfig) -> Result<Database> {
    Database::new(config.get_database_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_idempotent() {
        let db = Database::open_in_memory().expect("open store");
        db.with_connection(Database::seed_templates).expect("reseed");
        assert_eq!(db.list_template_names().expect("names"), vec![DEFAULT_TEMPLATE_NAME]);
    }

    #[test]
    fn test_default_template_has_six_placeholders() {
        for field in ["{activity}", "{activist}", "{agenda}", "{venue}", "{time}", "{strength}"] {
            assert!(DEFAULT_TEMPLATE_TEXT.contains(field), "missing {field}");
        }
    }
}
