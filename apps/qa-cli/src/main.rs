use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use announce_sequencer::{BatchRunner, Sequencer, SequencerConfig, SequencerMetrics};
use audio_playback::{CommandPlayer, MockPlayer, PlaybackOptions, PlaybackWatchdog, PlayerKind};
use call_detector::{
    build_snapshot, CalledTicketSource, HttpCalledTicketSource, LastCallStore, UdpCallPublisher,
};
use speech_synth::{HttpSynthesizer, MockSynthesizer, SynthesisRequest, Synthesizer};
use text_localizer::{localize, profile_for, text_direction, PROFILES};
use ticket_call::{now_millis, AnnouncementRequest};
use voice_settings::{
    HttpSettingsSource, MockSettingsSource, SettingsResolver, VoiceSettings,
};

#[derive(Parser, Debug)]
#[command(
    name = "qa",
    version,
    about = "Queue announcer operator CLI",
    disable_help_subcommand = true
)]
struct Cli {
    /// Backend root URL
    #[arg(long, env = "QA_BASE_URL", global = true, default_value = "http://127.0.0.1:8080/api")]
    base_url: String,

    #[arg(long, env = "QA_TENANT_ID", global = true, default_value = "default")]
    tenant_id: String,

    /// Bearer token for backend calls
    #[arg(long, env = "QA_API_TOKEN", global = true, hide_env_values = true)]
    api_token: Option<String>,

    /// HTTP timeout in milliseconds
    #[arg(long, global = true, default_value_t = 5000u64)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Player {
    Mpv,
    Ffplay,
}

impl From<Player> for PlayerKind {
    fn from(p: Player) -> Self {
        match p {
            Player::Mpv => PlayerKind::Mpv,
            Player::Ffplay => PlayerKind::Ffplay,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List announcement languages
    Languages,
    /// Render the announcement sentence per language
    Localize {
        #[arg(long)]
        ticket: String,
        #[arg(long, default_value = "N/A")]
        counter: String,
        /// Language codes in box order
        #[arg(long = "lang", default_values_t = vec!["en".to_string()])]
        languages: Vec<String>,
    },
    /// Resolve the tenant's voice settings
    Settings {
        /// Print JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Synthesize one box and optionally play it
    Synthesize {
        #[arg(long)]
        ticket: String,
        #[arg(long, default_value = "N/A")]
        counter: String,
        #[arg(long = "lang", default_value = "en")]
        language: String,
        /// Play the clip after synthesis
        #[arg(long, action = ArgAction::SetTrue)]
        play: bool,
        #[arg(long, value_enum, default_value = "mpv")]
        player: Player,
    },
    /// Publish a call notice to displays and record it as the last call
    Call {
        #[arg(long)]
        ticket: String,
        #[arg(long, default_value = "N/A")]
        counter: String,
        /// Display address to notify (repeatable)
        #[arg(long = "peer")]
        peers: Vec<SocketAddr>,
        /// Last-call record to update
        #[arg(long)]
        last_call: Option<PathBuf>,
    },
    /// Fetch the called-ticket list once and print the snapshot
    PollOnce {
        /// Print JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Run the announcement pipeline offline and print metrics
    Simulate {
        /// Tickets to call, in order
        #[arg(long = "ticket", required = true)]
        tickets: Vec<String>,
        #[arg(long = "lang", default_values_t = vec!["en".to_string()])]
        languages: Vec<String>,
        /// Simulated clip length in milliseconds
        #[arg(long, default_value_t = 300u64)]
        clip_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();
    let backend = Backend {
        base_url: cli.base_url.clone(),
        tenant_id: cli.tenant_id.clone(),
        api_token: cli.api_token.clone(),
        timeout: Duration::from_millis(cli.timeout_ms),
    };

    match cli.command {
        Commands::Languages => languages(),
        Commands::Localize {
            ticket,
            counter,
            languages,
        } => localize_cmd(&ticket, &counter, &languages),
        Commands::Settings { json } => settings_cmd(&backend, json).await,
        Commands::Synthesize {
            ticket,
            counter,
            language,
            play,
            player,
        } => synthesize_cmd(&backend, &ticket, &counter, &language, play, player).await,
        Commands::Call {
            ticket,
            counter,
            peers,
            last_call,
        } => call_cmd(&ticket, &counter, peers, last_call).await,
        Commands::PollOnce { json } => poll_once_cmd(&backend, json).await,
        Commands::Simulate {
            tickets,
            languages,
            clip_ms,
        } => simulate_cmd(&tickets, languages, clip_ms).await,
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

struct Backend {
    base_url: String,
    tenant_id: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl Backend {
    fn resolver(&self) -> Result<SettingsResolver> {
        let source = HttpSettingsSource::new(&self.base_url, self.timeout)
            .map_err(|e| anyhow!("settings source: {e}"))?
            .with_api_token(self.api_token.clone());
        Ok(SettingsResolver::new(Arc::new(source), self.tenant_id.clone()))
    }
}

fn languages() -> Result<()> {
    for profile in PROFILES {
        println!("{}\t{:?}\t{}", profile.code, profile.direction, profile.template);
    }
    Ok(())
}

fn localize_cmd(ticket: &str, counter: &str, languages: &[String]) -> Result<()> {
    for (i, lang) in languages.iter().enumerate() {
        let resolved = profile_for(lang).code;
        println!(
            "box {}\t{}->{}\t{:?}\t{}",
            i + 1,
            lang,
            resolved,
            text_direction(lang),
            localize(ticket, counter, lang)
        );
    }
    Ok(())
}

async fn settings_cmd(backend: &Backend, json: bool) -> Result<()> {
    let resolved = backend.resolver()?.resolve().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&resolved.settings)?);
    } else {
        let s = &resolved.settings;
        println!("origin: {:?}", resolved.origin);
        println!("voice: {}", s.voice_identity);
        println!("rate: {}  pitch: {}", s.speech_rate, s.speech_pitch);
        println!("languages: {}", s.languages.join(", "));
    }
    Ok(())
}

async fn synthesize_cmd(
    backend: &Backend,
    ticket: &str,
    counter: &str,
    language: &str,
    play: bool,
    player: Player,
) -> Result<()> {
    let settings = backend.resolver()?.resolve().await.settings;
    let synthesizer = HttpSynthesizer::new(&backend.base_url, backend.timeout)
        .map_err(|e| anyhow!("synthesizer: {e}"))?
        .with_api_token(backend.api_token.clone());

    let request = SynthesisRequest {
        text: localize(ticket, counter, language),
        voice_identity: settings.voice_identity.clone(),
        rate: settings.speech_rate,
        pitch: settings.speech_pitch,
        language: language.to_string(),
    };
    println!("text: {}", request.text);
    let resource = synthesizer
        .synthesize(&request)
        .await
        .context("synthesis failed")?;
    synthesizer
        .verify(&resource)
        .await
        .context("audio resource not reachable")?;
    println!("url: {}", resource.url);
    if let Some(d) = resource.duration {
        println!("duration: {} ms", d.as_millis());
    }

    if play {
        let player = CommandPlayer::new(player.into());
        let options = PlaybackOptions::new(settings.speech_rate, settings.speech_pitch);
        let outcome = PlaybackWatchdog::default()
            .play(&player, &resource, &options)
            .await;
        println!("playback: {outcome:?}");
    }
    Ok(())
}

async fn call_cmd(
    ticket: &str,
    counter: &str,
    peers: Vec<SocketAddr>,
    last_call: Option<PathBuf>,
) -> Result<()> {
    let call = AnnouncementRequest::new(ticket, counter, now_millis());
    if peers.is_empty() && last_call.is_none() {
        return Err(anyhow!("nothing to do: pass --peer and/or --last-call"));
    }
    if let Some(path) = last_call {
        LastCallStore::new(&path)
            .save(&call)
            .map_err(|e| anyhow!("{e}"))?;
        println!("last call: {}", path.display());
    }
    if !peers.is_empty() {
        let publisher = UdpCallPublisher::new(peers)
            .await
            .map_err(|e| anyhow!("{e}"))?;
        let delivered = publisher.publish(&call).await.map_err(|e| anyhow!("{e}"))?;
        println!("notified {delivered} display(s)");
    }
    info!(%call, "call published");
    println!("{call}");
    Ok(())
}

async fn poll_once_cmd(backend: &Backend, json: bool) -> Result<()> {
    let source = HttpCalledTicketSource::new(&backend.base_url, backend.timeout)
        .map_err(|e| anyhow!("ticket source: {e}"))?
        .with_api_token(backend.api_token.clone());
    let tickets = source
        .called_tickets()
        .await
        .map_err(|e| anyhow!("poll failed: {e}"))?;
    let snapshot = build_snapshot(tickets);
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else if snapshot.is_empty() {
        println!("no called tickets");
    } else {
        for call in &snapshot {
            println!(
                "{}\t{}\t{}",
                call.ticket_number, call.counter_number, call.called_at_timestamp
            );
        }
    }
    Ok(())
}

async fn simulate_cmd(tickets: &[String], languages: Vec<String>, clip_ms: u64) -> Result<()> {
    let metrics = SequencerMetrics::new().map_err(|e| anyhow!("{e}"))?;
    let settings = VoiceSettings {
        languages,
        ..VoiceSettings::default()
    };
    let resolver = SettingsResolver::new(Arc::new(MockSettingsSource::fixed(settings)), "sim");
    let config = SequencerConfig::default();
    let runner = BatchRunner::new(
        Arc::new(resolver),
        Arc::new(MockSynthesizer::new(Duration::from_millis(clip_ms))),
        Arc::new(MockPlayer::new()),
        config.clone(),
        metrics.clone(),
    );
    let sequencer = Sequencer::new(runner, config, metrics.clone());

    let base = now_millis();
    for (i, ticket) in tickets.iter().enumerate() {
        let call = AnnouncementRequest::new(ticket.as_str(), format!("{}", i + 1), base + i as i64);
        let outcome = sequencer.submit(call);
        println!("{ticket}: {outcome:?}");
    }
    sequencer.wait_idle().await;
    print!("{}", metrics.encode_text());
    Ok(())
}
