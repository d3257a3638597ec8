//! Travel database access shared by the flight and ticket tools.
//!
//! The database is the SQLite file with `flights`, `tickets`, `ticket_flights` and
//! `boarding_passes` tables. Every operation opens its own connection inside
//! `spawn_blocking`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use serde_json::{Map, Value};

use crate::tool_source::ToolSourceError;

/// Handle to the travel database file. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TravelDb {
    path: PathBuf,
}

impl TravelDb {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` with a fresh connection on the blocking pool.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T, ToolSourceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, ToolSourceError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = Connection::open(&path)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| ToolSourceError::Database(e.to_string()))?
    }
}

/// Runs a query and collects every row as a JSON object keyed by column name.
pub(crate) fn query_objects(
    conn: &Connection,
    sql: &str,
    params: &[rusqlite::types::Value],
) -> Result<Vec<Map<String, Value>>, ToolSourceError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(row_to_object(row, &columns)?);
    }
    Ok(out)
}

fn row_to_object(row: &Row<'_>, columns: &[String]) -> Result<Map<String, Value>, ToolSourceError> {
    let mut obj = Map::with_capacity(columns.len());
    for (i, name) in columns.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => Value::from(f),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
        };
        obj.insert(name.clone(), value);
    }
    Ok(obj)
}

/// Serializes rows as the JSON array handed back to the model.
pub(crate) fn rows_to_text(rows: Vec<Map<String, Value>>) -> Result<String, ToolSourceError> {
    let rows: Vec<Value> = rows.into_iter().map(Value::Object).collect();
    serde_json::to_string(&rows).map_err(|e| ToolSourceError::Database(e.to_string()))
}

/// Parses a `scheduled_departure` value such as `2024-04-30 12:09:03.561731-04:00`.
/// Values without an offset are read as local time.
pub(crate) fn parse_flight_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(t) = DateTime::parse_from_str(raw, fmt) {
            return Some(t);
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(DateTime::<FixedOffset>::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: rows keep column names and SQLite types map to JSON types.
    #[tokio::test]
    async fn query_objects_maps_columns_and_types() {
        let dir = tempfile::tempdir().unwrap();
        let db = TravelDb::new(dir.path().join("t.sqlite"));
        let rows = db
            .with_conn(|conn| {
                conn.execute_batch(
                    "CREATE TABLE f (id INTEGER, code TEXT, price REAL, note TEXT);
                     INSERT INTO f VALUES (7, 'LX0112', 12.5, NULL);",
                )?;
                query_objects(conn, "SELECT * FROM f WHERE id = ?", &[7i64.into()])
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 7);
        assert_eq!(rows[0]["code"], "LX0112");
        assert_eq!(rows[0]["price"], 12.5);
        assert!(rows[0]["note"].is_null());
        let text = rows_to_text(rows).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back[0]["code"], "LX0112");
    }

    #[test]
    fn parse_flight_time_accepts_offsets_and_naive() {
        let t = parse_flight_time("2024-04-30 12:09:03.561731-04:00").unwrap();
        assert_eq!(t.offset().local_minus_utc(), -4 * 3600);
        assert!(parse_flight_time("2024-04-30 12:09:03-04").is_some());
        assert!(parse_flight_time("2024-04-30 12:09:03").is_some());
        assert!(parse_flight_time("tomorrow").is_none());
    }
}
