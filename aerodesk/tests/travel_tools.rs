//! Travel database tools against a fixture database: ownership and rebooking rules.

mod common;
mod init_logging;

use aerodesk::tools::{
    CancelTicketTool, FetchUserFlightInformationTool, SearchFlightsTool, Tool,
    UpdateTicketToNewFlightTool,
};
use aerodesk::ToolCallContext;
use common::*;
use serde_json::{json, Value};

fn signed_in() -> ToolCallContext {
    ToolCallContext::for_passenger(PASSENGER_ID)
}

/// **Scenario**: only the signed-in passenger's tickets are listed, joined with seat data.
#[tokio::test]
async fn fetch_user_flight_information_lists_own_tickets() {
    let fx = TravelFixture::new();
    let tool = FetchUserFlightInformationTool::new(fx.db());
    let out = tool.call(json!({}), Some(&signed_in())).await.unwrap();
    let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["ticket_no"], OWN_TICKET);
    assert_eq!(rows[0]["seat_no"], "18E");
    assert_eq!(rows[0]["flight_id"], FLIGHT_BOOKED);
    assert_eq!(rows[0]["fare_conditions"], "Economy");
}

#[tokio::test]
async fn search_flights_filters_by_airports() {
    let fx = TravelFixture::new();
    let tool = SearchFlightsTool::new(fx.db());
    let out = tool
        .call(
            json!({"departure_airport": "ZRH", "arrival_airport": "JFK"}),
            None,
        )
        .await
        .unwrap();
    let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["flight_no"], "LX0016");
}

#[tokio::test]
async fn search_flights_honours_limit() {
    let fx = TravelFixture::new();
    let tool = SearchFlightsTool::new(fx.db());
    let out = tool
        .call(json!({"departure_airport": "CDG", "limit": 2}), None)
        .await
        .unwrap();
    let rows: Vec<Value> = serde_json::from_str(&out.text).unwrap();
    assert_eq!(rows.len(), 2);
}

/// **Scenario**: rebooking to a valid later flight updates ticket_flights.
#[tokio::test]
async fn update_ticket_moves_to_new_flight() {
    let fx = TravelFixture::new();
    let tool = UpdateTicketToNewFlightTool::new(fx.db());
    let out = tool
        .call(
            json!({"ticket_no": OWN_TICKET, "new_flight_id": FLIGHT_LATER}),
            Some(&signed_in()),
        )
        .await
        .unwrap();
    assert_eq!(out.text, "Ticket successfully updated to new flight.");
    assert_eq!(fx.booked_flight(OWN_TICKET), Some(FLIGHT_LATER));
}

/// **Scenario**: a flight departing within three hours is refused and nothing changes.
#[tokio::test]
async fn update_ticket_refuses_flight_within_three_hours() {
    let fx = TravelFixture::new();
    let tool = UpdateTicketToNewFlightTool::new(fx.db());
    let out = tool
        .call(
            json!({"ticket_no": OWN_TICKET, "new_flight_id": FLIGHT_SOON}),
            Some(&signed_in()),
        )
        .await
        .unwrap();
    assert!(
        out.text
            .starts_with("Not permitted to reschedule to a flight that is less than 3 hours"),
        "{}",
        out.text
    );
    assert_eq!(fx.booked_flight(OWN_TICKET), Some(FLIGHT_BOOKED));
}

#[tokio::test]
async fn update_ticket_rejects_unknown_flight() {
    let fx = TravelFixture::new();
    let tool = UpdateTicketToNewFlightTool::new(fx.db());
    let out = tool
        .call(
            json!({"ticket_no": OWN_TICKET, "new_flight_id": 1}),
            Some(&signed_in()),
        )
        .await
        .unwrap();
    assert_eq!(out.text, "Invalid new flight ID provided.");
}

#[tokio::test]
async fn update_ticket_rejects_unknown_ticket() {
    let fx = TravelFixture::new();
    let tool = UpdateTicketToNewFlightTool::new(fx.db());
    let out = tool
        .call(
            json!({"ticket_no": "nope", "new_flight_id": FLIGHT_LATER}),
            Some(&signed_in()),
        )
        .await
        .unwrap();
    assert_eq!(out.text, "No existing ticket found for the given ticket number.");
}

/// **Scenario**: another passenger's ticket is neither rebooked nor cancelled.
#[tokio::test]
async fn tickets_of_other_passengers_are_untouchable() {
    let fx = TravelFixture::new();
    let expected = format!(
        "Current signed-in passenger with ID {} not the owner of ticket {}",
        PASSENGER_ID, OTHER_TICKET
    );

    let update = UpdateTicketToNewFlightTool::new(fx.db());
    let out = update
        .call(
            json!({"ticket_no": OTHER_TICKET, "new_flight_id": FLIGHT_LATER}),
            Some(&signed_in()),
        )
        .await
        .unwrap();
    assert_eq!(out.text, expected);

    let cancel = CancelTicketTool::new(fx.db());
    let out = cancel
        .call(json!({"ticket_no": OTHER_TICKET}), Some(&signed_in()))
        .await
        .unwrap();
    assert_eq!(out.text, expected);
    assert_eq!(fx.booked_flight(OTHER_TICKET), Some(FLIGHT_BOOKED));
}

#[tokio::test]
async fn cancel_ticket_removes_booking() {
    let fx = TravelFixture::new();
    let tool = CancelTicketTool::new(fx.db());
    let out = tool
        .call(json!({"ticket_no": OWN_TICKET}), Some(&signed_in()))
        .await
        .unwrap();
    assert_eq!(out.text, "Ticket successfully cancelled.");
    assert_eq!(fx.booked_flight(OWN_TICKET), None);

    let again = tool
        .call(json!({"ticket_no": OWN_TICKET}), Some(&signed_in()))
        .await
        .unwrap();
    assert_eq!(again.text, "No existing ticket found for the given ticket number.");
}
