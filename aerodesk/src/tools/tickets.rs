//! Ticket tools for the signed-in passenger: list, rebook, cancel.
//!
//! The passenger comes from [`ToolCallContext::passenger_id`]; a call without one
//! fails with `No passenger ID configured.`. Business-rule refusals (unknown ticket,
//! wrong owner, too-close departure) are returned as plain text so the model can relay
//! them to the user.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension};
use serde_json::json;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::db::{parse_flight_time, query_objects, rows_to_text, TravelDb};
use crate::tools::Tool;

pub const TOOL_FETCH_USER_FLIGHT_INFORMATION: &str = "fetch_user_flight_information";
pub const TOOL_UPDATE_TICKET_TO_NEW_FLIGHT: &str = "update_ticket_to_new_flight";
pub const TOOL_CANCEL_TICKET: &str = "cancel_ticket";

const MIN_RESCHEDULE_NOTICE_HOURS: i64 = 3;

const USER_FLIGHTS_SQL: &str = "\
SELECT t.ticket_no, t.book_ref, f.flight_id, f.flight_no, f.departure_airport, \
f.arrival_airport, f.scheduled_departure, f.scheduled_arrival, bp.seat_no, tf.fare_conditions \
FROM tickets t \
JOIN ticket_flights tf ON t.ticket_no = tf.ticket_no \
JOIN flights f ON tf.flight_id = f.flight_id \
JOIN boarding_passes bp ON bp.ticket_no = t.ticket_no AND bp.flight_id = f.flight_id \
WHERE t.passenger_id = ?";

const NOT_FOUND_TICKET: &str = "No existing ticket found for the given ticket number.";

fn passenger_id(ctx: Option<&ToolCallContext>) -> Result<String, ToolSourceError> {
    ctx.and_then(|c| c.passenger_id.clone())
        .ok_or_else(|| ToolSourceError::InvalidInput("No passenger ID configured.".into()))
}

fn required_str(args: &serde_json::Value, key: &str) -> Result<String, ToolSourceError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing {}", key)))
}

/// Accepts `123` or `"123"`; models send both.
fn required_i64(args: &serde_json::Value, key: &str) -> Result<i64, ToolSourceError> {
    let v = args
        .get(key)
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing {}", key)))?;
    v.as_i64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("{} must be an integer", key)))
}

fn not_owner(passenger_id: &str, ticket_no: &str) -> String {
    format!(
        "Current signed-in passenger with ID {} not the owner of ticket {}",
        passenger_id, ticket_no
    )
}

/// Loads every ticket of a passenger joined with flight and seat data.
pub(crate) async fn user_flights(db: &TravelDb, passenger_id: String) -> Result<String, ToolSourceError> {
    let rows = db
        .with_conn(move |conn| query_objects(conn, USER_FLIGHTS_SQL, &[passenger_id.into()]))
        .await?;
    rows_to_text(rows)
}

/// `fetch_user_flight_information()`: all tickets of the signed-in passenger.
pub struct FetchUserFlightInformationTool {
    db: TravelDb,
}

impl FetchUserFlightInformationTool {
    pub fn new(db: TravelDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for FetchUserFlightInformationTool {
    fn name(&self) -> &str {
        TOOL_FETCH_USER_FLIGHT_INFORMATION
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_FETCH_USER_FLIGHT_INFORMATION.to_string(),
            description: Some(
                "Fetch all tickets for the user along with corresponding flight information and seat assignments."
                    .to_string(),
            ),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn call(
        &self,
        _args: serde_json::Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let passenger_id = passenger_id(ctx)?;
        Ok(ToolCallContent::new(user_flights(&self.db, passenger_id).await?))
    }
}

/// `update_ticket_to_new_flight(ticket_no, new_flight_id)`.
pub struct UpdateTicketToNewFlightTool {
    db: TravelDb,
}

impl UpdateTicketToNewFlightTool {
    pub fn new(db: TravelDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for UpdateTicketToNewFlightTool {
    fn name(&self) -> &str {
        TOOL_UPDATE_TICKET_TO_NEW_FLIGHT
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_UPDATE_TICKET_TO_NEW_FLIGHT.to_string(),
            description: Some("Update the user's ticket to a new valid flight.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ticket_no": { "type": "string" },
                    "new_flight_id": { "type": "integer" }
                },
                "required": ["ticket_no", "new_flight_id"]
            }),
        }
    }

    async fn call(
        &self,
        args: serde_json::Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let passenger_id = passenger_id(ctx)?;
        let ticket_no = required_str(&args, "ticket_no")?;
        let new_flight_id = required_i64(&args, "new_flight_id")?;

        let message = self
            .db
            .with_conn(move |conn| {
                let departure: Option<String> = conn
                    .query_row(
                        "SELECT scheduled_departure FROM flights WHERE flight_id = ?",
                        params![new_flight_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                let Some(departure) = departure else {
                    return Ok("Invalid new flight ID provided.".to_string());
                };
                let departs_at = parse_flight_time(&departure).ok_or_else(|| {
                    ToolSourceError::Database(format!("unreadable departure time: {}", departure))
                })?;
                let notice = departs_at.with_timezone(&Utc) - Utc::now();
                if notice < Duration::hours(MIN_RESCHEDULE_NOTICE_HOURS) {
                    return Ok(format!(
                        "Not permitted to reschedule to a flight that is less than 3 hours from the current time. Selected flight is at {}.",
                        departure
                    ));
                }

                let current: Option<i64> = conn
                    .query_row(
                        "SELECT flight_id FROM ticket_flights WHERE ticket_no = ?",
                        params![ticket_no],
                        |row| row.get(0),
                    )
                    .optional()?;
                if current.is_none() {
                    return Ok(NOT_FOUND_TICKET.to_string());
                }

                let owned: Option<String> = conn
                    .query_row(
                        "SELECT ticket_no FROM tickets WHERE ticket_no = ? AND passenger_id = ?",
                        params![ticket_no, passenger_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if owned.is_none() {
                    return Ok(not_owner(&passenger_id, &ticket_no));
                }

                conn.execute(
                    "UPDATE ticket_flights SET flight_id = ? WHERE ticket_no = ?",
                    params![new_flight_id, ticket_no],
                )?;
                tracing::info!(ticket_no = %ticket_no, new_flight_id, "ticket rebooked");
                Ok("Ticket successfully updated to new flight.".to_string())
            })
            .await?;
        Ok(ToolCallContent::new(message))
    }
}

/// `cancel_ticket(ticket_no)`.
pub struct CancelTicketTool {
    db: TravelDb,
}

impl CancelTicketTool {
    pub fn new(db: TravelDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for CancelTicketTool {
    fn name(&self) -> &str {
        TOOL_CANCEL_TICKET
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_CANCEL_TICKET.to_string(),
            description: Some("Cancel the user's ticket and remove it from the database.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": { "ticket_no": { "type": "string" } },
                "required": ["ticket_no"]
            }),
        }
    }

    async fn call(
        &self,
        args: serde_json::Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let passenger_id = passenger_id(ctx)?;
        let ticket_no = required_str(&args, "ticket_no")?;

        let message = self
            .db
            .with_conn(move |conn| {
                let existing: Option<i64> = conn
                    .query_row(
                        "SELECT flight_id FROM ticket_flights WHERE ticket_no = ?",
                        params![ticket_no],
                        |row| row.get(0),
                    )
                    .optional()?;
                if existing.is_none() {
                    return Ok(NOT_FOUND_TICKET.to_string());
                }

                let owned: Option<String> = conn
                    .query_row(
                        "SELECT ticket_no FROM tickets WHERE ticket_no = ? AND passenger_id = ?",
                        params![ticket_no, passenger_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if owned.is_none() {
                    return Ok(not_owner(&passenger_id, &ticket_no));
                }

                conn.execute(
                    "DELETE FROM ticket_flights WHERE ticket_no = ?",
                    params![ticket_no],
                )?;
                tracing::info!(ticket_no = %ticket_no, "ticket cancelled");
                Ok("Ticket successfully cancelled.".to_string())
            })
            .await?;
        Ok(ToolCallContent::new(message))
    }
}
