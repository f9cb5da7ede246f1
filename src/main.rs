//! Recap CLI - summarise pages through a remote service and ask about them
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use dialoguer::Input;
use recap::summary::Exchange;
use recap::{ui, Config, Outcome, ServiceClient, SessionState, Style};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recap")]
#[command(author, version, about = "Summarise webpages through a remote service", long_about = None)]
struct Cli {
    /// Base address of the summarisation service (overrides config and RECAP_SERVICE_URL)
    #[arg(long, global = true)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a webpage or video by URL
    Summarise {
        /// URL to summarise
        url: String,
        /// Summary style: executive, detailed, bullet_points or academic
        #[arg(long, short)]
        style: Option<Style>,
        /// Ask follow-up questions after the summary
        #[arg(long)]
        chat: bool,
    },
    /// Ask a question within an existing session
    Ask {
        /// Session id returned by a previous summary
        #[arg(long)]
        session: String,
        /// The question
        question: String,
    },
    /// Check that the summarisation service is reachable
    Status,
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log lines would tear the TUI's alternate screen, so it stays quiet by default.
    init_tracing(if cli.command.is_none() { "off" } else { "recap=warn" });

    let mut config = Config::load()?;
    if let Some(url) = cli.service_url {
        config.service.base_url = url;
    }
    let client = ServiceClient::new(&config.service.base_url)?;

    match cli.command {
        Some(Commands::Summarise { url, style, chat }) => {
            let mut state = SessionState::new(style.unwrap_or(config.defaults.style));
            state.set_url(url);
            println!("Summarising {} ({})...\n", state.url(), state.style());

            if state.submit_summarize(&client).await != Outcome::Applied {
                bail!(state
                    .last_error()
                    .unwrap_or("summarise request failed")
                    .to_string());
            }
            print_summary(&state);

            if chat {
                chat_loop(&mut state, &client).await?;
            }
        }
        Some(Commands::Ask { session, question }) => {
            let mut state = SessionState::resume(session);
            state.set_question(question);
            match state.submit_question(&client).await {
                Outcome::Applied => print_history(state.history()),
                Outcome::Rejected(reason) => bail!("question not sent: {}", reason),
                _ => bail!(state
                    .last_error()
                    .unwrap_or("failed to get an answer")
                    .to_string()),
            }
        }
        Some(Commands::Status) => {
            let status = client
                .health()
                .await
                .with_context(|| format!("service at {} is not responding", client.base_url()))?;
            println!("{} {}", "✔".green(), client.base_url());
            println!("  {}", status.message);
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "recap", &mut std::io::stdout());
        }
        None => {
            // Default: Launch the TUI
            ui::run(client, config.defaults.style).await?;
        }
    }

    Ok(())
}

fn print_summary(state: &SessionState) {
    let Some(result) = state.result() else {
        return;
    };
    println!("{} ({})", "Summary".bold(), result.content_type);
    println!("  {}\n", result.summary);

    if !result.key_insights.is_empty() {
        println!("{}", "Key Insights".bold());
        for insight in &result.key_insights {
            println!("  • {}", insight);
        }
    }

    if let Some(session) = state.session_id() {
        println!("\n{} {}", "Session:".dimmed(), session);
    }
}

fn print_history(history: &[Exchange]) {
    for exchange in history {
        println!("\n{} {}", "Q:".cyan().bold(), exchange.question);
        println!("{} {}", "A:".green().bold(), exchange.answer);
    }
}

/// Ask follow-up questions until the user enters nothing or `exit`
async fn chat_loop(state: &mut SessionState, client: &ServiceClient) -> anyhow::Result<()> {
    println!("\nAsk a follow-up question (empty line or 'exit' to finish).");
    loop {
        let question: String = Input::new()
            .with_prompt("?")
            .allow_empty(true)
            .interact_text()?;
        let trimmed = question.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("exit") {
            return Ok(());
        }

        state.set_question(question);
        match state.submit_question(client).await {
            Outcome::Applied => print_history(state.history()),
            Outcome::Failed => eprintln!(
                "{} {}",
                "Error:".red(),
                state.last_error().unwrap_or("question failed")
            ),
            _ => {}
        }
    }
}
