use homework_relay::config::{Credentials, Settings};
use homework_relay::logging;
use homework_relay::module::homework::PracticumClient;
use homework_relay::module::notifier::TelegramNotifier;
use homework_relay::module::scheduled::{PollState, Relay};

use anyhow::{Context, Result};
use chrono::Utc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine: the variables may come from the real environment
    dotenvy::dotenv().ok();

    let settings = Settings::load().context("Failed to load settings")?;

    let _logging_guard = logging::init_logging(&settings.log_dir, "homework-relay", &settings.log_level)?;

    tracing::info!("Homework relay starting...");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!(severity = "critical", "{}", e);
            return Err(e).context("Configuration check failed");
        }
    };

    let source = PracticumClient::new(
        settings.endpoint.clone(),
        credentials.practicum_token,
        settings.request_timeout(),
    )
    .context("Failed to build homework API client")?;

    let notifier = TelegramNotifier::new(
        settings.telegram_api_url.clone(),
        credentials.telegram_token,
        credentials.telegram_chat_id,
        settings.request_timeout(),
    )
    .context("Failed to build Telegram client")?;

    tracing::info!(
        "Relaying statuses from {} to chat {}",
        source.endpoint(),
        notifier.chat_id()
    );

    // Look back one period so a review finished just before startup is not missed
    let from_date = Utc::now().timestamp() - settings.retry_period_secs as i64;
    let relay = Relay::new(source, notifier, settings.retry_period(), PollState::starting_at(from_date));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let state = relay.run(shutdown).await;
    tracing::info!("Homework relay stopped (next window started at {})", state.from_date);

    Ok(())
}
