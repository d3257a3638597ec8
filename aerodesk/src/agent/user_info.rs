//! First step of every run: load the passenger's tickets into `user_info`.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::state::SupportState;
use crate::tools::{user_flights, TravelDb};

use super::graph::FETCH_USER_INFO_NODE;

/// Writes the signed-in passenger's flight information (a JSON array of ticket rows)
/// into [`SupportState::user_info`]. The passenger comes from the run config.
pub struct FetchUserInfoNode {
    db: TravelDb,
}

impl FetchUserInfoNode {
    pub fn new(db: TravelDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Node<SupportState> for FetchUserInfoNode {
    fn id(&self) -> &str {
        FETCH_USER_INFO_NODE
    }

    async fn run(&self, _state: SupportState) -> Result<(SupportState, Next), AgentError> {
        Err(AgentError::ExecutionFailed(
            "No passenger ID configured.".into(),
        ))
    }

    async fn run_with_context(
        &self,
        state: SupportState,
        ctx: &RunContext,
    ) -> Result<(SupportState, Next), AgentError> {
        let passenger_id = ctx
            .config
            .passenger_id
            .clone()
            .ok_or_else(|| AgentError::ExecutionFailed("No passenger ID configured.".into()))?;
        let user_info = user_flights(&self.db, passenger_id)
            .await
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?;
        tracing::debug!(len = user_info.len(), "fetched user info");
        Ok((SupportState { user_info, ..state }, Next::Continue))
    }
}
