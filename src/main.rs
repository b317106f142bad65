use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use raidrelay::application::usecases::HandleReportUseCase;
use raidrelay::application::{
    Clock, CooldownTracker, GuildMembershipCache, MembershipCheck, Notifier, ProfileMembership,
};
use raidrelay::infrastructure::{
    clock::SystemClock, console_notifier::ConsoleNotifier, discord_notifier::DiscordNotifier,
    multi_notifier::MultiNotifier, wynncraft_provider::WynncraftClient,
};
use raidrelay::interfaces::config::{Config, Env, MembershipMode, log_filter};
use raidrelay::interfaces::http_api::{ApiState, build_router};

#[derive(Parser, Debug)]
#[command(name = "raidrelay")]
struct Args {
    /// Path to an optional config.yaml with tunables
    #[arg(long)]
    config: Option<String>,

    /// Do not post to Discord (console only)
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();
    let args = Args::parse();

    // 1) load config
    let cfg = match args.config.as_deref() {
        Some(path) => match Config::load_from_file(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    let env = match Env::from_env() {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    // 2) build infra
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let wynncraft = Arc::new(WynncraftClient::new(&cfg.api_base, cfg.upstream_timeout())?);

    let membership: Arc<dyn MembershipCheck> = match cfg.membership_mode {
        MembershipMode::Cache => {
            let cache = GuildMembershipCache::new(
                env.guild.clone(),
                wynncraft.clone(),
                clock.clone(),
                cfg.guild_cache_ttl(),
                cfg.upstream_timeout(),
            )
            .with_retry_backoff(cfg.guild_refresh_backoff());
            if let Err(e) = cache.refresh().await {
                tracing::warn!(guild = %env.guild, "initial guild refresh failed, will retry on demand: {e}");
            }
            Arc::new(cache)
        }
        MembershipMode::Profile => Arc::new(ProfileMembership::new(
            env.guild.clone(),
            wynncraft.clone(),
            cfg.upstream_timeout(),
        )),
    };

    let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(ConsoleNotifier::new())];
    if !args.dry_run {
        notifiers.push(Box::new(DiscordNotifier::new(
            env.webhook.clone(),
            cfg.upstream_timeout(),
        )?));
    } else {
        tracing::warn!("--dry-run enabled: only console output");
    }

    let cooldown = Arc::new(CooldownTracker::new(
        cfg.cooldown_policy().window,
        clock.clone(),
    ));
    spawn_cooldown_janitor(cooldown.clone(), cfg.purge_interval_seconds);

    // 3) usecase
    let handle_report = HandleReportUseCase {
        guild: env.guild.clone(),
        membership,
        cooldown,
        policy: cfg.cooldown_policy(),
        notifier: Arc::new(MultiNotifier::new(notifiers)),
    };

    // 4) serve
    let app = build_router(ApiState {
        handle_report: Arc::new(handle_report),
    });
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        guild = %env.guild,
        cooldown_seconds = cfg.cooldown_seconds,
        scope = ?cfg.cooldown_scope,
        mode = ?cfg.membership_mode,
        "raid relay listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_cooldown_janitor(cooldown: Arc<CooldownTracker>, every_seconds: u64) {
    if every_seconds == 0 {
        return;
    }
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(every_seconds));
        tick.tick().await;
        loop {
            tick.tick().await;
            let purged = cooldown.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, remaining = cooldown.len(), "purged expired cooldown keys");
            }
        }
    });
}
