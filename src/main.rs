//! atlas CLI: personal desktop automation agent.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use atlas::agent::Agent;
use atlas::config::AgentConfig;

#[derive(Parser)]
#[command(name = "atlas", version, about = "Personal desktop automation agent")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a single utterance and exit.
    Ask {
        /// The utterance, e.g. `atlas ask take a screenshot`.
        query: Vec<String>,
    },
}

fn main() -> miette::Result<()> {
    // Secrets (OPENAI_API_KEY, SMTP_PASS) usually live in a .env file.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("atlas=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AgentConfig::load(cli.config.as_deref())?;
    let agent = Agent::new(config)?;

    match cli.command {
        Some(Commands::Ask { query }) => {
            let reply = agent.handle(&query.join(" "));
            println!("{}", reply.response);
            if let Some(result) = reply.task_result {
                println!("{result}");
            }
        }
        None => repl(&agent)?,
    }
    Ok(())
}

/// Interactive loop: one utterance per line until `exit` or EOF.
fn repl(agent: &Agent) -> miette::Result<()> {
    println!("atlas {} — type 'exit' to quit", env!("CARGO_PKG_VERSION"));
    println!("notes: {}", agent.config().paths.notes_dir.display());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("input error: {e}");
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = agent.handle(line);
        println!("{}", reply.response);
        if let Some(result) = reply.task_result {
            println!("{result}");
        }
    }
    Ok(())
}
