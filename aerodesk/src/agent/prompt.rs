//! Prompt template for the support assistant.

use chrono::{DateTime, Local};

use crate::message::Message;
use crate::state::SupportState;

/// System message; `{user_info}` and `{time}` are filled at render time.
pub const SUPPORT_SYSTEM_TEMPLATE: &str = "You are a helpful customer support assistant for Swiss Airlines.  \
Use the provided tools to search for flights, company policies, and other information to assist the user's queries.  \
When searching, be persistent. Expand your query bounds if the first search returns no results.  \
If a search comes up empty, expand your search before giving up.\n\n\
Current user:\n<User>\n{user_info}\n</User>\n\
Current time: {time}.";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// System message plus the conversation history.
#[derive(Debug, Clone)]
pub struct AssistantPrompt {
    template: String,
}

impl Default for AssistantPrompt {
    fn default() -> Self {
        Self {
            template: SUPPORT_SYSTEM_TEMPLATE.to_string(),
        }
    }
}

impl AssistantPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, state: &SupportState) -> Vec<Message> {
        self.render_at(state, Local::now())
    }

    pub fn render_at(&self, state: &SupportState, now: DateTime<Local>) -> Vec<Message> {
        let system = self
            .template
            .replace("{time}", &now.format(TIME_FORMAT).to_string())
            .replace("{user_info}", &state.user_info);
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(system));
        messages.extend(state.messages.iter().cloned());
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn render_fills_user_info_and_time_then_history() {
        let state = SupportState {
            messages: vec![Message::user("when is my flight?")],
            user_info: r#"[{"ticket_no":"7240005432906569"}]"#.into(),
        };
        let now = Local.with_ymd_and_hms(2024, 4, 25, 9, 30, 0).unwrap();
        let messages = AssistantPrompt::new().render_at(&state, now);

        assert_eq!(messages.len(), 2);
        let Message::System(system) = &messages[0] else {
            panic!("expected system message first");
        };
        assert!(system.starts_with("You are a helpful customer support assistant for Swiss Airlines."));
        assert!(system.contains("<User>\n[{\"ticket_no\":\"7240005432906569\"}]\n</User>"));
        assert!(system.ends_with("Current time: 2024-04-25 09:30:00.000000."));
        assert_eq!(messages[1], Message::user("when is my flight?"));
    }
}
