//! Aerodesk CLI: talk to the airline support assistant from the terminal.
//!
//! With a message (`-m` or positional) one turn runs and the program exits unless
//! `-i` is given; without one it starts the interactive loop.

mod display;
mod logging;
mod repl;

use std::path::PathBuf;

use aerodesk::{build_support_runner, ModelSettings, SupportConfig};
use clap::Parser;
use repl::{run_repl_loop, stdin_lines, Session};

#[derive(Parser, Debug)]
#[command(name = "aerodesk")]
#[command(about = "Aerodesk: airline customer support assistant with approval of actions")]
struct Args {
    /// User message (or pass as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Positional args: user message when -m/--message is not used
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,

    /// Signed-in passenger
    #[arg(short, long, env = "AERODESK_PASSENGER_ID", value_name = "ID")]
    passenger_id: Option<String>,

    /// Thread ID for conversation continuity; a fresh one when unset
    #[arg(long, value_name = "ID")]
    thread_id: Option<String>,

    /// Travel SQLite database
    #[arg(long, env = "AERODESK_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Markdown policy document
    #[arg(long, env = "AERODESK_POLICY_FILE", value_name = "PATH")]
    policy: Option<PathBuf>,

    /// SQLite file for checkpoints; in memory when unset
    #[arg(long, env = "AERODESK_CHECKPOINT_DB", value_name = "PATH")]
    checkpoint_db: Option<PathBuf>,

    /// Chat model name
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Keep chatting after the first message
    #[arg(short, long)]
    interactive: bool,
}

impl Args {
    fn user_message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| (!self.rest.is_empty()).then(|| self.rest.join(" ")))
            .filter(|m| !m.trim().is_empty())
    }

    fn support_config(&self) -> SupportConfig {
        let mut config = SupportConfig::from_env();
        if let Some(ref db) = self.db {
            config.db_path = db.clone();
        }
        if let Some(ref policy) = self.policy {
            config.policy_path = policy.clone();
        }
        if self.checkpoint_db.is_some() {
            config.checkpoint_db = self.checkpoint_db.clone();
        }
        if let Some(ref id) = self.passenger_id {
            config = config.with_passenger_id(id.clone());
        }
        config
    }

    fn model_settings(&self) -> ModelSettings {
        let mut settings = ModelSettings::from_env();
        if let Some(ref model) = self.model {
            settings.chat_model = model.clone();
        }
        settings
    }
}

fn generate_thread_id() -> String {
    format!("thread-{}", uuid::Uuid::new_v4())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Env that is already set wins over .env and the XDG config.
    if let Err(e) = config::load_and_apply("aerodesk", None::<&std::path::Path>) {
        eprintln!("warning: config not loaded: {}", e);
    }
    logging::init()?;

    let args = Args::parse();
    let config = args.support_config();
    if config.passenger_id.is_none() {
        eprintln!("warning: no passenger id; set --passenger-id or AERODESK_PASSENGER_ID");
    }
    let runner = build_support_runner(&config, &args.model_settings()).await?;

    let thread_id = args.thread_id.clone().unwrap_or_else(generate_thread_id);
    tracing::info!(thread_id = %thread_id, "session started");
    let mut session = Session::new(&runner, thread_id);
    session.skip_history().await?;
    let mut lines = stdin_lines();

    match args.user_message() {
        Some(message) => {
            let open = session.turn(&message, &mut lines).await?;
            if open && args.interactive {
                run_repl_loop(&mut session, &mut lines).await?;
            }
        }
        None => {
            println!("thread: {}", session.thread_id());
            run_repl_loop(&mut session, &mut lines).await?;
        }
    }
    Ok(())
}
