//! Renders conversation messages for the terminal.

use aerodesk::Message;

/// Longest rendered message before it is cut.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 1500;

/// Cuts `s` to at most `max` chars, marking the cut with " ... (truncated)".
pub fn truncate_message(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!("{} ... (truncated)", s.chars().take(max).collect::<String>())
}

fn header(role: &str) -> String {
    let title = format!(" {} Message ", role);
    format!("{:=^64}", title)
}

/// One message as a header line plus body; assistant tool calls are listed below the text.
pub fn render_message(message: &Message) -> String {
    let (role, mut body) = match message {
        Message::System(c) => ("System", c.clone()),
        Message::User(c) => ("Human", c.clone()),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut body = content.clone();
            if !tool_calls.is_empty() {
                if !body.is_empty() {
                    body.push('\n');
                }
                body.push_str("Tool Calls:");
                for call in tool_calls {
                    body.push_str(&format!(
                        "\n  {} ({})\n   Args: {}",
                        call.name, call.id, call.arguments
                    ));
                }
            }
            ("Ai", body)
        }
        Message::Tool {
            tool_call_id,
            content,
        } => ("Tool", format!("[{}]\n{}", tool_call_id, content)),
    };
    body = truncate_message(&body, DEFAULT_MAX_MESSAGE_LEN);
    format!("{}\n\n{}", header(role), body)
}
