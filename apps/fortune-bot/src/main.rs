use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use fortune_bot::{BotConfig, config::timezone_from_lookup};
use fortune_core::{CalendarDate, generate_for_date, render_fortune_text};
use fortune_telemetry::install as init_telemetry;
use tracing::error;

#[derive(Parser)]
#[command(name = "fortune-bot", version, about = "LINE daily fortune bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server (default).
    Serve,
    /// Print the fortune a user would get, without sending anything.
    Preview {
        #[arg(long)]
        user: String,
        /// Local date as YYYY-MM-DD; today in FORTUNE_TIMEZONE when omitted.
        #[arg(long)]
        date: Option<CalendarDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            init_telemetry("fortune-bot")?;
            let config = BotConfig::from_env().inspect_err(|err| {
                error!(error = %err, "invalid configuration");
            })?;
            fortune_bot::serve(config).await
        }
        Command::Preview { user, date } => {
            let date = match date {
                Some(date) => date,
                None => timezone_from_lookup(|key| std::env::var(key).ok())?
                    .to_calendar_date(Utc::now()),
            };
            let fortune = generate_for_date(&user, date);
            println!("{}", render_fortune_text(&fortune));
            Ok(())
        }
    }
}
