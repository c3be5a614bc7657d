mod config;

use announce_sequencer::{BatchRunner, Sequencer, SequencerMetrics};
use anyhow::{anyhow, Context, Result};
use audio_playback::{AudioPlayer, CommandPlayer, MockPlayer};
use call_detector::{
    listen, replay_last_call, HttpCalledTicketSource, LastCallStore, Poller, UdpCallFeed,
};
use clap::Parser;
use config::AnnouncerConfig;
use display_board::{ContentRotation, DisplayBoard};
use speech_synth::{HttpSynthesizer, MockSynthesizer, Synthesizer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use ticket_call::CallEvent;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use voice_settings::{FallbackCache, HttpSettingsSource, SettingsResolver};

#[derive(Parser)]
#[command(name = "announcer-daemon")]
#[command(about = "Ticket-call announcer for a queue display")]
struct Args {
    /// YAML config file; created with defaults when missing
    #[arg(long, env = "QA_CONFIG", default_value = "announcer.yaml")]
    config: PathBuf,

    /// Backend root URL
    #[arg(long, env = "QA_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "QA_TENANT_ID")]
    tenant_id: Option<String>,

    /// Bearer token for backend calls
    #[arg(long, env = "QA_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long, env = "QA_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// UDP address for call notices, e.g. 0.0.0.0:47800
    #[arg(long, env = "QA_BROADCAST_LISTEN")]
    broadcast_listen: Option<std::net::SocketAddr>,

    /// Log announcements instead of synthesizing and playing them
    #[arg(long, env = "QA_DRY_RUN")]
    dry_run: bool,
}

impl Args {
    fn apply(&self, config: &mut AnnouncerConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(tenant) = &self.tenant_id {
            config.tenant_id = tenant.clone();
        }
        if self.api_token.is_some() {
            config.api_token = self.api_token.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if self.broadcast_listen.is_some() {
            config.broadcast.listen = self.broadcast_listen;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    let mut config = AnnouncerConfig::load(&args.config)?;
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    info!("announcer-daemon starting");
    info!(
        base_url = %config.base_url,
        tenant = %config.tenant_id,
        dry_run = args.dry_run,
        "configuration loaded"
    );

    let metrics =
        SequencerMetrics::new().map_err(|e| anyhow!("Failed to create metrics: {}", e))?;
    let sequencer = build_sequencer(&config, args.dry_run, metrics.clone())?;

    let (events_tx, events_rx) = mpsc::channel::<CallEvent>(64);

    // A call published before this process attached its listener.
    if let Some(path) = &config.last_call_path {
        let store = LastCallStore::new(path);
        if replay_last_call(&store, &events_tx).await {
            info!(path = %path.display(), "submitted last known call");
        }
    }

    let source = HttpCalledTicketSource::new(&config.base_url, config.http_timeout())
        .map_err(|e| anyhow!("Failed to create ticket source: {}", e))?
        .with_api_token(config.api_token.clone());
    let poller = Poller::new(Arc::new(source), config.poll_interval(), events_tx.clone());
    tokio::spawn(poller.run());
    info!(interval_ms = config.poll_interval_ms, "poller started");

    if let Some(addr) = config.broadcast.listen {
        let feed = UdpCallFeed::bind(addr)
            .await
            .map_err(|e| anyhow!("Failed to bind broadcast listener: {}", e))?;
        tokio::spawn(listen(feed, events_tx.clone()));
        info!(%addr, "broadcast listener started");
    }
    drop(events_tx);

    spawn_display(&config, &sequencer);

    let runner = sequencer.clone();
    let mut run_handle = tokio::spawn(async move { runner.run(events_rx).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
        _ = &mut run_handle => warn!("all call detectors stopped"),
    }
    run_handle.abort();

    if sequencer.is_announcing() {
        warn!("shutting down mid-announcement");
    }
    info!("final metrics:\n{}", metrics.encode_text());
    info!("announcer-daemon shutting down");
    Ok(())
}

fn build_sequencer(
    config: &AnnouncerConfig,
    dry_run: bool,
    metrics: SequencerMetrics,
) -> Result<Sequencer> {
    let timeout = config.http_timeout();

    let settings_source = HttpSettingsSource::new(&config.base_url, timeout)
        .map_err(|e| anyhow!("Failed to create settings source: {}", e))?
        .with_api_token(config.api_token.clone());
    let fallback = match &config.settings_cache_path {
        Some(path) => FallbackCache::with_file(path),
        None => FallbackCache::in_memory(),
    };
    let resolver = SettingsResolver::new(Arc::new(settings_source), config.tenant_id.clone())
        .with_fallback(fallback);

    let (synthesizer, player): (Arc<dyn Synthesizer>, Arc<dyn AudioPlayer>) = if dry_run {
        warn!("dry run: audio is simulated");
        (
            Arc::new(MockSynthesizer::new(Duration::from_millis(1500))),
            Arc::new(MockPlayer::new()),
        )
    } else {
        let synthesizer = HttpSynthesizer::new(&config.base_url, timeout)
            .map_err(|e| anyhow!("Failed to create synthesizer: {}", e))?
            .with_api_token(config.api_token.clone());
        let mut player = CommandPlayer::new(config.player.kind);
        if let Some(program) = &config.player.program {
            player = player.with_program(program.clone());
        }
        (Arc::new(synthesizer), Arc::new(player))
    };
    info!(player = player.name(), "audio player ready");

    let sequencer_config = config.sequencer_config();
    let runner = BatchRunner::new(
        Arc::new(resolver),
        synthesizer,
        player,
        sequencer_config.clone(),
        metrics.clone(),
    );
    Ok(Sequencer::new(runner, sequencer_config, metrics))
}

fn spawn_display(config: &AnnouncerConfig, sequencer: &Sequencer) {
    let mut board = DisplayBoard::new(config.display.rows, config.display.languages.clone());
    let mut display_rx = sequencer.subscribe_display();
    tokio::spawn(async move {
        while board.follow(&mut display_rx).await {
            for line in board.render_lines() {
                info!(target: "display", "{}", line);
            }
        }
    });

    if config.display.media.is_empty() {
        return;
    }
    let rotation = ContentRotation::new(
        config.display.media.clone(),
        Duration::from_millis(config.display.slide_interval_ms),
    );
    let (media_tx, mut media_rx) = watch::channel(None);
    tokio::spawn(rotation.run(media_tx));
    tokio::spawn(async move {
        while media_rx.changed().await.is_ok() {
            if let Some(item) = media_rx.borrow_and_update().as_ref() {
                info!(target: "display", kind = ?item.kind, source = %item.source, "media");
            }
        }
    });
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
