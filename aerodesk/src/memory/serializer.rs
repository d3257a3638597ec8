//! Serializer for checkpoint state (state <-> bytes).

use crate::memory::checkpointer::CheckpointError;

/// Serializes and deserializes state for persistent checkpointers.
///
/// `MemorySaver` keeps `Checkpoint<S>` values directly and does not use one.
pub trait Serializer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON serializer for any serde state.
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::state::SupportState;

    /// **Scenario**: a support state with user_info survives serialization.
    #[test]
    fn json_serializer_keeps_support_state() {
        let state = SupportState {
            messages: vec![Message::user("hi"), Message::assistant("hello")],
            user_info: "[]".into(),
        };
        let bytes = Serializer::<SupportState>::serialize(&JsonSerializer, &state).unwrap();
        let back: SupportState = JsonSerializer.deserialize(&bytes).unwrap();
        assert_eq!(back.messages, state.messages);
        assert_eq!(back.user_info, "[]");
    }

    /// **Scenario**: Invalid JSON on deserialize returns CheckpointError::Serialization.
    #[test]
    fn json_serializer_invalid_json_returns_checkpoint_error() {
        let result: Result<SupportState, _> = JsonSerializer.deserialize(b"{ not valid json ]");
        assert!(matches!(result, Err(CheckpointError::Serialization(_))));
    }
}
