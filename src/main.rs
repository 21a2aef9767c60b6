//! Wiring & DI. Entry point: bootstrap adapters from config, inject into the notifier, run one command.
//! No business logic here; delivery rules live in EmailNotifier.
//!
//! Usage:
//!   message-notify view-modes
//!   message-notify deliver <job.json>

use message_notify::adapters::locale::StaticLanguageProvider;
use message_notify::adapters::mail::{HttpRelayDispatcher, LogMailDispatcher, SmtpMailDispatcher};
use message_notify::adapters::persistence::{MemoryAccountStore, SqliteAccountStore};
use message_notify::domain::{Message, OutputBundle};
use message_notify::ports::{AccountStore, LanguageProvider, MailDispatcher, Notifier};
use message_notify::shared::config::{AppConfig, NotifierOptions, TransportKind};
use message_notify::usecases::EmailNotifier;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// One delivery as handed over by the upstream dispatcher.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeliveryJob {
    message: Message,
    output: OutputBundle,
    /// Overrides the configured notifier options for this job.
    #[serde(default)]
    options: Option<NotifierOptions>,
}

impl DeliveryJob {
    /// Parse a job; jobs without `options` take the configured defaults.
    fn parse(raw: &str, defaults: &NotifierOptions) -> serde_json::Result<(Self, NotifierOptions)> {
        let job: Self = serde_json::from_str(raw)?;
        let options = job.options.clone().unwrap_or_else(|| defaults.clone());
        Ok((job, options))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv::dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    if command == "view-modes" {
        println!(
            "{}",
            serde_json::to_string_pretty(&EmailNotifier::email_view_modes())?
        );
        return Ok(());
    }
    if command != "deliver" {
        anyhow::bail!("usage: message-notify view-modes | message-notify deliver <job.json>");
    }
    let job_path = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("deliver needs a job file"))?;

    let cfg = AppConfig::load()?;

    let accounts = build_account_store(&cfg).await?;
    let languages = build_language_provider(&cfg).await?;
    let mailer = build_mail_dispatcher(&cfg)?;
    let notifier = EmailNotifier::new(accounts, languages, mailer);

    let raw = tokio::fs::read_to_string(&job_path)
        .await
        .map_err(|e| anyhow::anyhow!("read {}: {}", job_path.display(), e))?;
    let (job, options) = DeliveryJob::parse(&raw, &cfg.notifier)
        .map_err(|e| anyhow::anyhow!("parse {}: {}", job_path.display(), e))?;

    info!(
        notifier = notifier.name(),
        uid = job.message.uid,
        category = %job.message.message_type,
        "delivering message"
    );
    let result = notifier
        .deliver(&job.message, &options, job.output)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn build_account_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn AccountStore>> {
    if let Some(db_path) = &cfg.database_path {
        let store = SqliteAccountStore::connect(db_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?;
        if let Some(seed) = &cfg.accounts_path {
            store
                .seed_from_json(seed)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }
        return Ok(Arc::new(store));
    }
    if let Some(path) = &cfg.accounts_path {
        let store = MemoryAccountStore::from_json_file(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        info!(accounts = store.len(), path = %path, "loaded accounts from JSON");
        return Ok(Arc::new(store));
    }
    warn!("no MESSAGE_NOTIFY_DATABASE_PATH or MESSAGE_NOTIFY_ACCOUNTS_PATH; account lookups will fail");
    Ok(Arc::new(MemoryAccountStore::new(Vec::new())))
}

async fn build_language_provider(cfg: &AppConfig) -> anyhow::Result<Arc<dyn LanguageProvider>> {
    let default_code = cfg.default_language_or_default();
    let provider = match &cfg.languages_path {
        Some(path) => StaticLanguageProvider::from_json_file(path, default_code)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => {
            if default_code != "en" {
                anyhow::bail!(
                    "default language '{}' needs MESSAGE_NOTIFY_LANGUAGES_PATH",
                    default_code
                );
            }
            StaticLanguageProvider::english()
        }
    };
    Ok(Arc::new(provider))
}

fn build_mail_dispatcher(cfg: &AppConfig) -> anyhow::Result<Arc<dyn MailDispatcher>> {
    match cfg.transport_or_default() {
        TransportKind::Smtp => {
            if !cfg.is_smtp_configured() {
                anyhow::bail!("SMTP transport needs MESSAGE_NOTIFY_SMTP_HOST and MESSAGE_NOTIFY_MAIL_FROM");
            }
            let credentials = cfg.smtp_username.clone().zip(cfg.smtp_password.clone());
            let dispatcher = SmtpMailDispatcher::new(
                cfg.smtp_host.as_deref().unwrap_or_default(),
                cfg.smtp_port_or_default(),
                cfg.smtp_tls_or_default(),
                credentials,
                cfg.mail_from.as_deref().unwrap_or_default(),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?;
            info!(
                host = cfg.smtp_host.as_deref().unwrap_or_default(),
                port = cfg.smtp_port_or_default(),
                tls = ?cfg.smtp_tls_or_default(),
                "SMTP transport enabled"
            );
            Ok(Arc::new(dispatcher))
        }
        TransportKind::Http => {
            let Some(url) = cfg.relay_url.clone() else {
                anyhow::bail!("HTTP transport needs MESSAGE_NOTIFY_RELAY_URL");
            };
            info!(url = %url, "HTTP relay transport enabled");
            Ok(Arc::new(HttpRelayDispatcher::new(url, cfg.relay_token.clone())))
        }
        TransportKind::Log => {
            warn!("MESSAGE_NOTIFY_TRANSPORT not set, using log-only mail transport");
            Ok(Arc::new(LogMailDispatcher::new()))
        }
    }
}
