//! Shared fixtures: a small travel database in a temp dir.

#![allow(dead_code)]

use std::path::PathBuf;

use aerodesk::TravelDb;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use tempfile::TempDir;

pub const PASSENGER_ID: &str = "3442 587242";
pub const OTHER_PASSENGER_ID: &str = "8149 604011";

/// Ticket of `PASSENGER_ID` on flight `FLIGHT_BOOKED`.
pub const OWN_TICKET: &str = "7240005432906569";
/// Ticket of `OTHER_PASSENGER_ID`.
pub const OTHER_TICKET: &str = "7240005432906570";

pub const FLIGHT_BOOKED: i64 = 19250;
pub const FLIGHT_LATER: i64 = 19251;
/// Departs one hour after the fixture is created.
pub const FLIGHT_SOON: i64 = 19300;

const SCHEMA: &str = "
CREATE TABLE flights (
    flight_id INTEGER PRIMARY KEY,
    flight_no TEXT,
    scheduled_departure TEXT,
    scheduled_arrival TEXT,
    departure_airport TEXT,
    arrival_airport TEXT,
    status TEXT,
    aircraft_code TEXT,
    actual_departure TEXT,
    actual_arrival TEXT
);
CREATE TABLE tickets (
    ticket_no TEXT PRIMARY KEY,
    book_ref TEXT,
    passenger_id TEXT
);
CREATE TABLE ticket_flights (
    ticket_no TEXT,
    flight_id INTEGER,
    fare_conditions TEXT,
    amount REAL
);
CREATE TABLE boarding_passes (
    ticket_no TEXT,
    flight_id INTEGER,
    boarding_no INTEGER,
    seat_no TEXT
);
";

/// Temp travel database; dropped with the directory.
pub struct TravelFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TravelFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("travel.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let soon = (Utc::now() + Duration::hours(1))
            .format("%Y-%m-%d %H:%M:%S%.6f%:z")
            .to_string();
        let flights: [(i64, &str, String, &str, &str); 4] = [
            (FLIGHT_BOOKED, "LX0112", "2099-05-01 10:00:00.000000+02:00".into(), "CDG", "BSL"),
            (FLIGHT_LATER, "LX0112", "2099-05-02 10:00:00.000000+02:00".into(), "CDG", "BSL"),
            (FLIGHT_SOON, "LX0112", soon, "CDG", "BSL"),
            (19400, "LX0016", "2099-05-01 13:15:00.000000+02:00".into(), "ZRH", "JFK"),
        ];
        for (id, no, departure, from, to) in flights {
            conn.execute(
                "INSERT INTO flights (flight_id, flight_no, scheduled_departure, scheduled_arrival, \
                 departure_airport, arrival_airport, status, aircraft_code) \
                 VALUES (?, ?, ?, ?, ?, ?, 'Scheduled', '319')",
                params![id, no, departure, departure, from, to],
            )
            .unwrap();
        }

        for (ticket, book_ref, passenger) in [
            (OWN_TICKET, "C46E9F", PASSENGER_ID),
            (OTHER_TICKET, "C46EA0", OTHER_PASSENGER_ID),
        ] {
            conn.execute(
                "INSERT INTO tickets VALUES (?, ?, ?)",
                params![ticket, book_ref, passenger],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO ticket_flights VALUES (?, ?, 'Economy', 12500.0)",
                params![ticket, FLIGHT_BOOKED],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO boarding_passes VALUES (?, ?, 1, '18E')",
                params![ticket, FLIGHT_BOOKED],
            )
            .unwrap();
        }

        Self { _dir: dir, path }
    }

    pub fn db(&self) -> TravelDb {
        TravelDb::new(&self.path)
    }

    /// Flight the ticket is booked on, or `None` once cancelled.
    pub fn booked_flight(&self, ticket_no: &str) -> Option<i64> {
        let conn = Connection::open(&self.path).unwrap();
        conn.query_row(
            "SELECT flight_id FROM ticket_flights WHERE ticket_no = ?",
            params![ticket_no],
            |row| row.get(0),
        )
        .ok()
    }
}
