use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    lootsplit_channels::StaticDirectory,
    lootsplit_commands::{Caller, LootService, Renderer, ServiceSettings},
    lootsplit_config::{AuthConfig, LootsplitConfig},
    lootsplit_sessions::{ChannelKey, JsonFileStore},
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "lootsplit", about = "lootsplit: loot run tracker and fair split")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding lootsplit.toml and the session snapshot.
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Commands {
    /// Open a loot session for the mentioned players.
    Start {
        #[arg(long)]
        channel: String,
        /// User id of the leader starting the session.
        #[arg(long = "as")]
        caller: String,
        /// Player mentions, e.g. "<@111> <@222>".
        #[arg(long)]
        players: String,
        /// Guild tax percent (defaults to the configured value).
        #[arg(long)]
        tax: Option<i64>,
    },
    /// Record cash a player looted.
    AddCash {
        #[arg(long)]
        channel: String,
        #[arg(long)]
        player: String,
        /// Amount such as 50k or 1.25m.
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Add item value to the shared pool (negative to correct).
    AddItems {
        #[arg(long)]
        channel: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Show the running totals.
    Status {
        #[arg(long)]
        channel: String,
    },
    /// Settle and close the session.
    Finalize {
        #[arg(long)]
        channel: String,
        #[arg(long = "as")]
        caller: String,
    },
    /// Discard the session without settling.
    Cancel {
        #[arg(long)]
        channel: String,
        #[arg(long = "as")]
        caller: String,
    },
    /// List channels with an active session.
    Sessions,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Build the command service from config: the snapshot file for
/// persistence and the `[members]` table as the member directory.
fn build_service(config: &LootsplitConfig) -> anyhow::Result<LootService> {
    let sessions_path = config
        .storage
        .resolve_sessions_path(&lootsplit_config::data_dir());
    debug!(path = %sessions_path.display(), "using session snapshot");
    let directory = StaticDirectory::from(config.members.clone());
    LootService::load(
        Arc::new(JsonFileStore::new(sessions_path)),
        Arc::new(directory),
        ServiceSettings::from_config(config),
    )
}

/// Run one command and return the reply text.
async fn execute(
    service: &LootService,
    renderer: &Renderer,
    auth: &AuthConfig,
    command: Commands,
) -> anyhow::Result<String> {
    let caller = |user_id: String| {
        let authorized = auth.is_admin(&user_id);
        Caller::new(user_id, authorized)
    };

    let reply = match command {
        Commands::Start {
            channel,
            caller: user_id,
            players,
            tax,
        } => {
            let started = service
                .start(&ChannelKey::new(channel), &caller(user_id), &players, tax)
                .await?;
            renderer.started(&started)
        },
        Commands::AddCash {
            channel,
            player,
            amount,
        } => {
            let added = service
                .add_cash(&ChannelKey::new(channel), &player, &amount)
                .await?;
            renderer.cash_added(&added)
        },
        Commands::AddItems { channel, amount } => {
            let added = service
                .add_items(&ChannelKey::new(channel), &amount)
                .await?;
            renderer.items_added(&added)
        },
        Commands::Status { channel } => {
            let status = service.status(&ChannelKey::new(channel)).await?;
            renderer.status(&status)
        },
        Commands::Finalize {
            channel,
            caller: user_id,
        } => {
            let report = service
                .finalize(&ChannelKey::new(channel), &caller(user_id))
                .await?;
            renderer.settlement(&report)
        },
        Commands::Cancel {
            channel,
            caller: user_id,
        } => {
            service
                .cancel(&ChannelKey::new(channel), &caller(user_id))
                .await?;
            renderer.cancelled()
        },
        Commands::Sessions => {
            let channels = service.active_channels().await;
            if channels.is_empty() {
                "No active loot sessions.".to_string()
            } else {
                channels
                    .iter()
                    .map(ChannelKey::to_string)
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        },
    };
    Ok(reply)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    if let Some(dir) = cli.config_dir.clone() {
        lootsplit_config::set_config_dir(dir);
    }
    let config = lootsplit_config::discover_and_load();
    info!(version = env!("CARGO_PKG_VERSION"), "lootsplit starting");

    let service = build_service(&config)?;
    let renderer = Renderer::new(config.ledger.thousands_separator.clone());
    let reply = execute(&service, &renderer, &config.auth, cli.command).await?;
    println!("{reply}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::BTreeMap};

    fn config(dir: &std::path::Path) -> LootsplitConfig {
        let mut config = LootsplitConfig::default();
        config.storage.sessions_path = dir.join("sessions.json");
        config.auth.admins = vec!["111".into()];
        config.members = BTreeMap::from([
            ("111".to_string(), "Aria".to_string()),
            ("222".to_string(), "Bram".to_string()),
        ]);
        config
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "lootsplit",
            "add-items",
            "--channel",
            "c1",
            "-200k",
        ])
        .unwrap();
        assert_eq!(cli.command, Commands::AddItems {
            channel: "c1".into(),
            amount: "-200k".into(),
        });

        let cli = Cli::try_parse_from([
            "lootsplit",
            "start",
            "--channel",
            "c1",
            "--as",
            "111",
            "--players",
            "<@111> <@222>",
            "--tax",
            "10",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Start { tax: Some(10), .. }));
    }

    #[tokio::test]
    async fn full_session_through_the_cli() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let renderer = Renderer::default();

        let run = |command: Commands| {
            let config = config.clone();
            let renderer = renderer.clone();
            async move {
                let service = build_service(&config).unwrap();
                execute(&service, &renderer, &config.auth, command).await
            }
        };

        let reply = run(Commands::Start {
            channel: "c1".into(),
            caller: "111".into(),
            players: "<@111> <@222>".into(),
            tax: None,
        })
        .await
        .unwrap();
        assert!(reply.contains("<@222> (Bram)"));

        run(Commands::AddCash {
            channel: "c1".into(),
            player: "222".into(),
            amount: "100k".into(),
        })
        .await
        .unwrap();

        let reply = run(Commands::Sessions).await.unwrap();
        assert_eq!(reply, "c1");

        let err = run(Commands::Finalize {
            channel: "c1".into(),
            caller: "222".into(),
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("permission"));

        let reply = run(Commands::Finalize {
            channel: "c1".into(),
            caller: "111".into(),
        })
        .await
        .unwrap();
        assert!(reply.contains("<@222> -> <@111>: 50.000 silver"));

        let err = run(Commands::Status {
            channel: "c1".into(),
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no active loot session"));
    }
}
