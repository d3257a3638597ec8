//! Tools bound to the support assistant.
//!
//! Each tool implements [`Tool`]; [`support_tools`] registers them on an
//! [`AggregateToolSource`] in the order the model is shown them:
//!
//! 1. `tavily_search_results_json` (only with an API key)
//! 2. `fetch_user_flight_information`
//! 3. `search_flights`
//! 4. `lookup_policy`
//! 5. `update_ticket_to_new_flight`
//! 6. `cancel_ticket`

mod db;
mod flights;
mod policy;
mod registry;
mod tickets;
mod r#trait;
mod web_search;

use std::sync::Arc;

pub use db::TravelDb;
pub use flights::{SearchFlightsTool, TOOL_SEARCH_FLIGHTS};
pub use policy::{LookupPolicyTool, TOOL_LOOKUP_POLICY};
pub use r#trait::Tool;
pub use registry::AggregateToolSource;
pub use tickets::{
    CancelTicketTool, FetchUserFlightInformationTool, UpdateTicketToNewFlightTool,
    TOOL_CANCEL_TICKET, TOOL_FETCH_USER_FLIGHT_INFORMATION, TOOL_UPDATE_TICKET_TO_NEW_FLIGHT,
};
pub use web_search::{TavilySearchTool, TOOL_TAVILY_SEARCH};

pub(crate) use tickets::user_flights;

use crate::retrieval::PolicyRetriever;

/// Registers the full support tool set.
pub fn support_tools(
    db: &TravelDb,
    retriever: Arc<PolicyRetriever>,
    tavily_api_key: Option<&str>,
) -> AggregateToolSource {
    let mut source = AggregateToolSource::new();
    if let Some(key) = tavily_api_key.filter(|k| !k.is_empty()) {
        source.register(Box::new(TavilySearchTool::new(key)));
    }
    source.register(Box::new(FetchUserFlightInformationTool::new(db.clone())));
    source.register(Box::new(SearchFlightsTool::new(db.clone())));
    source.register(Box::new(LookupPolicyTool::new(retriever)));
    source.register(Box::new(UpdateTicketToNewFlightTool::new(db.clone())));
    source.register(Box::new(CancelTicketTool::new(db.clone())));
    source
}
