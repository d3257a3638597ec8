//! Flight search over the `flights` table.

use async_trait::async_trait;
use serde_json::json;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::db::{query_objects, rows_to_text, TravelDb};
use crate::tools::Tool;

pub const TOOL_SEARCH_FLIGHTS: &str = "search_flights";

const DEFAULT_LIMIT: i64 = 20;

fn optional_str(args: &serde_json::Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Builds the filter query for the given arguments. Bounds that are absent are skipped.
fn build_search(args: &serde_json::Value) -> Result<(String, Vec<rusqlite::types::Value>), ToolSourceError> {
    let mut sql = String::from("SELECT * FROM flights WHERE 1 = 1");
    let mut params: Vec<rusqlite::types::Value> = Vec::new();
    let filters = [
        ("departure_airport", "departure_airport = ?"),
        ("arrival_airport", "arrival_airport = ?"),
        ("start_time", "scheduled_departure >= ?"),
        ("end_time", "scheduled_departure <= ?"),
    ];
    for (key, clause) in filters {
        if let Some(value) = optional_str(args, key) {
            sql.push_str(" AND ");
            sql.push_str(clause);
            params.push(value.into());
        }
    }
    let limit = match args.get("limit") {
        None | Some(serde_json::Value::Null) => DEFAULT_LIMIT,
        Some(v) => v
            .as_i64()
            .filter(|n| *n > 0)
            .ok_or_else(|| ToolSourceError::InvalidInput("limit must be a positive integer".into()))?,
    };
    sql.push_str(" LIMIT ?");
    params.push(limit.into());
    Ok((sql, params))
}

/// `search_flights(departure_airport?, arrival_airport?, start_time?, end_time?, limit=20)`.
pub struct SearchFlightsTool {
    db: TravelDb,
}

impl SearchFlightsTool {
    pub fn new(db: TravelDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for SearchFlightsTool {
    fn name(&self) -> &str {
        TOOL_SEARCH_FLIGHTS
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_SEARCH_FLIGHTS.to_string(),
            description: Some(
                "Search for flights based on departure airport, arrival airport, and departure time range."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "departure_airport": { "type": "string", "description": "IATA code, e.g. CDG" },
                    "arrival_airport": { "type": "string", "description": "IATA code, e.g. BSL" },
                    "start_time": { "type": "string", "description": "Earliest scheduled departure, YYYY-MM-DD HH:MM:SS" },
                    "end_time": { "type": "string", "description": "Latest scheduled departure, YYYY-MM-DD HH:MM:SS" },
                    "limit": { "type": "integer", "default": DEFAULT_LIMIT }
                }
            }),
        }
    }

    async fn call(
        &self,
        args: serde_json::Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let (sql, params) = build_search(&args)?;
        let rows = self
            .db
            .with_conn(move |conn| query_objects(conn, &sql, &params))
            .await?;
        tracing::debug!(count = rows.len(), "search_flights");
        Ok(ToolCallContent::new(rows_to_text(rows)?))
    }
}
