//! Interactive loop: read a line, run one turn, print the new messages, repeat.
//!
//! Whenever the assistant asks to run tools the user is asked to approve. `y`
//! runs them; any other answer is sent back as the reason for denying them.

use std::io::Write;

use aerodesk::{AgentError, SupportRunner, TurnOutcome};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::display::render_message;

pub const APPROVAL_PROMPT: &str = "Do you approve of the above actions? Type 'y' to continue; otherwise, explain your requested changed.\n\n";

type StdinLines = Lines<BufReader<Stdin>>;

/// One conversation thread and how much of it has been printed.
pub struct Session<'a> {
    runner: &'a SupportRunner,
    thread_id: String,
    printed: usize,
}

impl<'a> Session<'a> {
    pub fn new(runner: &'a SupportRunner, thread_id: impl Into<String>) -> Self {
        Self {
            runner,
            thread_id: thread_id.into(),
            printed: 0,
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Skips messages already stored for a resumed thread.
    pub async fn skip_history(&mut self) -> Result<(), AgentError> {
        if let Some(state) = self.runner.state(&self.thread_id).await? {
            self.printed = state.messages.len();
        }
        Ok(())
    }

    async fn print_new_messages(&mut self) -> Result<(), AgentError> {
        let Some(state) = self.runner.state(&self.thread_id).await? else {
            return Ok(());
        };
        for message in state.messages.iter().skip(self.printed) {
            println!("{}\n", render_message(message));
        }
        self.printed = state.messages.len();
        Ok(())
    }

    /// Sends `text`, then keeps asking for approval until the assistant replies.
    /// Returns `false` when stdin closed during an approval prompt.
    pub async fn turn(
        &mut self,
        text: &str,
        lines: &mut StdinLines,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        let mut outcome = self.runner.send(&self.thread_id, text).await?;
        loop {
            self.print_new_messages().await?;
            match outcome {
                TurnOutcome::Reply(_) => return Ok(true),
                TurnOutcome::AwaitingApproval(calls) => {
                    tracing::debug!(count = calls.len(), "awaiting approval");
                    print!("{}", APPROVAL_PROMPT);
                    std::io::stdout().flush()?;
                    let Some(answer) = lines.next_line().await? else {
                        return Ok(false);
                    };
                    outcome = if is_approval(&answer) {
                        self.runner.approve(&self.thread_id).await?
                    } else {
                        self.runner.deny(&self.thread_id, answer.trim()).await?
                    };
                }
            }
        }
    }
}

/// Only a literal `y` approves.
pub fn is_approval(answer: &str) -> bool {
    answer.trim() == "y"
}

fn is_quit_command(line: &str) -> bool {
    matches!(
        line.trim().to_lowercase().as_str(),
        "quit" | "exit" | "/quit" | "q"
    )
}

pub fn stdin_lines() -> StdinLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Runs turns until EOF (Ctrl+D) or a quit command. Turn errors are printed and the
/// loop goes on.
pub async fn run_repl_loop(
    session: &mut Session<'_>,
    lines: &mut StdinLines,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };

        match session.turn(&line, lines).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("error: {}", e),
        }
    }
    println!("Bye.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_y_approves() {
        assert!(is_approval("y"));
        assert!(is_approval(" y\n"));
        assert!(!is_approval("yes"));
        assert!(!is_approval("Y"));
        assert!(!is_approval("no, pick a later flight"));
    }

    #[test]
    fn quit_commands() {
        for cmd in ["quit", "exit", "/quit", "q", "QUIT", "  exit  "] {
            assert!(is_quit_command(cmd), "{}", cmd);
        }
        assert!(!is_quit_command("when is my flight"));
    }
}
