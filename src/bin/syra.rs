use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use structopt::StructOpt;

use syra::api::{ApiClient, ApiError, ReqwestTransport};
use syra::classification::{logs_for_domain, remediation_text, RuleTable};
use syra::config::Config;
use syra::dashboard::{add_and_refresh, delete_and_refresh, ActionError, Dashboard, LoadState};
use syra::output::{OutputFormat, OutputHandler};
use syra::persistence::{MemoryTokenStore, SqliteTokenStore, TokenStore};
use syra::session::callback::location_path;
use syra::session::{CallbackListener, HistoryNavigator, SessionContext, SessionState, View};

const EXIT_FAILURE: i32 = 1;
const EXIT_SIGNED_OUT: i32 = 2;

/// SYRA security dashboard client
#[derive(StructOpt, Debug)]
#[structopt(name = "syra", about = "SYRA - Secure Your Realm Always")]
struct Opt {
    /// Path to configuration file
    #[structopt(short, long, default_value = "syra.toml")]
    config: PathBuf,

    /// Output format: console, json or jsonl (overrides the config file)
    #[structopt(short, long)]
    format: Option<String>,

    /// Keep the session token in memory only
    #[structopt(long)]
    ephemeral: bool,

    /// Enable informational logging
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "syra.toml")]
        output: PathBuf,
    },
    /// Sign in through the identity provider
    Login {
        /// Callback URL copied from the browser after signing in
        #[structopt(long)]
        callback: Option<String>,
        /// Loopback address to receive the callback on
        #[structopt(long)]
        listen: Option<String>,
    },
    /// Forget the session token
    Logout,
    /// Show whether a session token is held
    Status,
    /// Show attack statistics and every domain with its security logs
    Dashboard,
    /// Manage monitored domains
    Domains {
        #[structopt(subcommand)]
        action: DomainsCommand,
    },
    /// List security logs
    Logs {
        /// Only show logs for this domain name
        #[structopt(short, long)]
        domain: Option<String>,
    },
    /// Show attack statistics
    Stats,
    /// Show the remediation advice for a rule ID
    Remediation {
        rule_id: u32,
    },
}

#[derive(StructOpt, Debug)]
enum DomainsCommand {
    /// List monitored domains
    List,
    /// Add a domain by name or URL
    Add {
        url: String,
    },
    /// Delete a domain by id
    Delete {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::from_args();

    env_logger::Builder::from_default_env()
        .filter_level(if opt.verbose {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Command::Config { output } = &opt.command {
        Config::default().to_file(output)?;
        println!("Default configuration written to: {:?}", output);
        return Ok(());
    }

    let mut config = if opt.config.exists() {
        Config::from_file(&opt.config)?
    } else {
        log::info!("Config file {:?} not found, using defaults", opt.config);
        Config::default()
    };
    config.apply_env_overrides();

    let format = OutputFormat::from_str(opt.format.as_deref().unwrap_or(&config.output.format));
    let mut output = OutputHandler::new(format, config.output.file_path.clone())?;

    let store: Arc<dyn TokenStore> = if opt.ephemeral {
        Arc::new(MemoryTokenStore::new())
    } else {
        Arc::new(SqliteTokenStore::new(&config.session.store_path)?)
    };
    let navigator = Arc::new(HistoryNavigator::new());
    let session = SessionContext::new(store, navigator)
        .with_entry_point(&config.session.entry_point)
        .with_callback_path(&config.auth.callback_path);
    let api = ApiClient::new(Arc::new(ReqwestTransport::from_config(&config.api)), session.clone());

    match opt.command {
        Command::Config { .. } => unreachable!("handled before the session is opened"),
        Command::Login { callback, listen } => {
            login(&config, &session, &mut output, callback, listen).await?;
        }
        Command::Logout => {
            session.logout()?;
            output.write_message("Signed out.")?;
        }
        Command::Status => {
            let message = match session.state()? {
                SessionState::Authenticated => "Signed in.".to_string(),
                SessionState::Unauthenticated => format!(
                    "Signed out. Run `syra login` to sign in at {}",
                    config.login_url()
                ),
            };
            output.write_message(&message)?;
        }
        Command::Dashboard => match LoadState::from_result(Dashboard::load(&api).await) {
            LoadState::Loaded(dashboard) => output.write_dashboard(&dashboard)?,
            LoadState::SignedOut => signed_out(&config),
            LoadState::Failed(message) => {
                eprintln!("Something went wrong\n\n{}\n\nRun the command again to retry.", message);
                std::process::exit(EXIT_FAILURE);
            }
        },
        Command::Domains { action: DomainsCommand::List } => {
            let domains = api.list_domains().await.unwrap_or_else(|e| fail(&config, e));
            output.write_domains(&domains)?;
        }
        Command::Domains { action: DomainsCommand::Add { url } } => {
            let (created, domains) = add_and_refresh(&api, &url)
                .await
                .unwrap_or_else(|e| fail_action(&config, e));
            output.write_message(&format!("Added {} ({})", created.name, created.url))?;
            output.write_domains(&domains)?;
        }
        Command::Domains { action: DomainsCommand::Delete { id } } => {
            let domains = delete_and_refresh(&api, &id)
                .await
                .unwrap_or_else(|e| fail_action(&config, e));
            output.write_message(&format!("Deleted domain {}", id))?;
            output.write_domains(&domains)?;
        }
        Command::Logs { domain } => {
            let logs = api.list_security_logs().await.unwrap_or_else(|e| fail(&config, e));
            let selected = match domain {
                Some(name) => logs_for_domain(&name, &logs),
                None => logs.iter().collect(),
            };
            output.write_logs(&selected)?;
        }
        Command::Stats => {
            let stats = api.attack_stats().await.unwrap_or_else(|e| fail(&config, e));
            output.write_stats(&stats)?;
        }
        Command::Remediation { rule_id } => {
            let category = RuleTable::default()
                .classify(Some(rule_id))
                .map(|c| c.to_string())
                .unwrap_or_else(|| "Unclassified".to_string());
            output.write_message(&format!(
                "Rule {} ({}): {}",
                rule_id,
                category,
                remediation_text(Some(rule_id))
            ))?;
        }
    }

    output.flush()?;
    Ok(())
}

async fn login(
    config: &Config,
    session: &SessionContext,
    output: &mut OutputHandler,
    callback: Option<String>,
    listen: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if session.resolve_view(session.entry_point())? == View::Dashboard {
        output.write_message("Already signed in. Run `syra logout` first to switch accounts.")?;
        return Ok(());
    }

    let location = match callback {
        Some(location) => {
            let path = location_path(&location)?;
            if session.resolve_view(&path)? != View::Callback {
                eprintln!(
                    "Not a sign-in callback: expected a URL with path {}",
                    session.callback_path()
                );
                std::process::exit(EXIT_FAILURE);
            }
            location
        }
        None => {
            let address = listen.unwrap_or_else(|| config.auth.listen_address.clone());
            let listener = CallbackListener::bind(&address).await?;
            output.write_message(&format!("Open this URL to sign in: {}", config.login_url()))?;
            output.write_message(&format!(
                "Waiting for the sign-in callback on {}",
                listener.redirect_url(session.callback_path())?
            ))?;
            listener
                .accept_callback_within(
                    session.callback_path(),
                    Duration::from_secs(config.auth.callback_timeout_seconds),
                )
                .await?
        }
    };

    match session.capture_callback(&location)? {
        SessionState::Authenticated => output.write_message("Signed in.")?,
        SessionState::Unauthenticated => {
            output.write_message("No token was received; you are still signed out.")?
        }
    }
    Ok(())
}

fn signed_out(config: &Config) -> ! {
    eprintln!(
        "You are not signed in. Run `syra login` to sign in at {}",
        config.login_url()
    );
    std::process::exit(EXIT_SIGNED_OUT);
}

fn fail<T>(config: &Config, error: ApiError) -> T {
    if error.is_auth() {
        signed_out(config);
    }
    eprintln!("Something went wrong\n\n{}\n\nRun the command again to retry.", error);
    std::process::exit(EXIT_FAILURE);
}

fn fail_action<T>(config: &Config, error: ActionError) -> T {
    if error.api_error().is_auth() {
        signed_out(config);
    }
    eprintln!("{}", error);
    std::process::exit(EXIT_FAILURE);
}
