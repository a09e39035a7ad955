//! Conclave — headless debate client
//!
//! Connects to a debate backend, runs one consultation turn, streams
//! every agent's tokens to stdout, and records the turn into the local
//! session store so follow-up questions carry context.

use clap::{Parser, Subcommand};
use conclave_client::{health, ClientConfig, DebateClient};
use conclave_core::{AgentId, ClientCommand, ConnectionState, DebatePhase, ModelTier};
use conclave_session::{AgentSelection, ConsultationStore, TurnBenchmark};
use conclave_state::{DebateState, DebateStore};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "conclave", about = "Conclave — live multi-agent debate client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the panel a question and stream the debate
    Ask {
        /// The question to debate
        query: String,
        /// WebSocket endpoint of the debate backend
        #[arg(long, default_value = "ws://127.0.0.1:9170/ws")]
        url: String,
        /// HTTP base for the readiness probe
        #[arg(long, default_value = "http://127.0.0.1:9170")]
        http: String,
        /// Model tier: fast, balanced, deep
        #[arg(short, long, default_value = "balanced")]
        tier: String,
        /// Optional industry tag forwarded to the backend
        #[arg(long)]
        industry: Option<String>,
        /// Continue an existing session with prior-turn context
        #[arg(long)]
        follow_up: Option<String>,
        /// Agents to leave out (the synthesizer always stays)
        #[arg(long)]
        skip: Vec<String>,
        /// Session storage directory
        #[arg(long)]
        session_dir: Option<PathBuf>,
        /// Reconnect attempts before giving up
        #[arg(long, default_value = "5")]
        max_retries: u32,
    },
    /// List stored consultation sessions
    Sessions {
        #[arg(long)]
        session_dir: Option<PathBuf>,
    },
    /// Delete a stored session
    Delete {
        id: String,
        #[arg(long)]
        session_dir: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conclave=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ask {
            query,
            url,
            http,
            tier,
            industry,
            follow_up,
            skip,
            session_dir,
            max_retries,
        } => {
            let tier = parse_tier(&tier)?;
            let dir = resolve_dir(session_dir);
            run_debate(RunArgs {
                query,
                url,
                http,
                tier,
                industry,
                follow_up,
                skip,
                dir,
                max_retries,
            })
            .await
        }

        Commands::Sessions { session_dir } => {
            let store = ConsultationStore::load(resolve_dir(session_dir))?;
            for session in store.list_sessions() {
                let complete = session.turns.iter().filter(|t| t.is_complete).count();
                println!(
                    "{}  {}  {} turns ({} complete)",
                    session.id,
                    session.created_at.format("%Y-%m-%d %H:%M"),
                    session.turns.len(),
                    complete,
                );
                if let Some(turn) = session.turns.first() {
                    println!("    Q: {}", turn.query);
                }
            }
            Ok(())
        }

        Commands::Delete { id, session_dir } => {
            let store = ConsultationStore::load(resolve_dir(session_dir))?;
            store.delete_session(&id)?;
            println!("Deleted session {}", id);
            Ok(())
        }

        Commands::Version => {
            println!("conclave v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct RunArgs {
    query: String,
    url: String,
    http: String,
    tier: ModelTier,
    industry: Option<String>,
    follow_up: Option<String>,
    skip: Vec<String>,
    dir: PathBuf,
    max_retries: u32,
}

async fn run_debate(args: RunArgs) -> anyhow::Result<()> {
    let sessions = ConsultationStore::load(&args.dir)?;
    let store = Arc::new(DebateStore::new());

    health::wait_for_backend(&args.http, 30, Duration::from_secs(1)).await?;

    let client = DebateClient::new(
        ClientConfig {
            url: args.url.clone(),
            max_retries: args.max_retries,
            ..ClientConfig::default()
        },
        store.clone(),
    );
    client.connect();

    let mut rx = store.subscribe();
    wait_for_connection(&mut rx).await?;

    let mut selection = AgentSelection::all();
    for id in &args.skip {
        selection.deselect(&AgentId::new(id.as_str()));
    }
    let selected = selection.ids();

    let command = match &args.follow_up {
        Some(session_id) => {
            sessions.resume(session_id)?;
            let context = sessions.previous_turns_context();
            store.start_follow_up_turn(args.query.as_str());
            ClientCommand::follow_up(args.query.as_str(), args.tier, context, selected.clone())
        }
        None => {
            store.start_debate(args.query.as_str());
            let mut cmd =
                ClientCommand::start_debate(args.query.as_str(), args.tier, selected.clone());
            if let Some(industry) = &args.industry {
                if let ClientCommand::StartDebate { industry: slot, .. } = &mut cmd {
                    *slot = Some(industry.clone());
                }
            }
            cmd
        }
    };
    sessions.start_new_turn(&args.query, &selected);

    let started = std::time::Instant::now();
    if !client.send(&command) {
        anyhow::bail!("Transport not open, could not start the debate");
    }

    let outcome = tokio::select! {
        result = stream_debate(&mut rx, &sessions) => result?,
        _ = tokio::signal::ctrl_c() => {
            println!("\nInterrupted, turn left incomplete");
            client.close();
            return Ok(());
        }
    };

    // A turn that ended with an error stays incomplete so its partial
    // output never feeds the next turn's context.
    if let Some(error) = &outcome.error {
        println!("\nDebate ended with an error: {}", error);
        client.close();
        return Ok(());
    }

    // Final authoritative copy of every response, then persist.
    let responses: BTreeMap<AgentId, String> = outcome
        .agents
        .values()
        .filter(|a| a.has_content())
        .map(|a| (a.id.clone(), a.text.clone()))
        .collect();
    let benchmark = TurnBenchmark {
        total_tokens: outcome.aggregate.total_tokens,
        duration_seconds: started.elapsed().as_secs_f64(),
    };
    sessions.complete_turn(&responses, Some(benchmark))?;

    let projection = conclave_graph::project(&outcome);
    println!(
        "\nDebate complete: {} tokens, {} nodes / {} edges projected",
        outcome.aggregate.total_tokens,
        projection.nodes.len(),
        projection.edges.len(),
    );
    if let Some(session) = sessions.active_session() {
        println!("Session {} ({} turns)", session.id, session.turns.len());
    }

    client.close();
    Ok(())
}

async fn wait_for_connection(
    rx: &mut tokio::sync::watch::Receiver<Arc<DebateState>>,
) -> anyhow::Result<()> {
    let deadline = Duration::from_secs(30);
    tokio::time::timeout(deadline, async {
        loop {
            {
                let snap = rx.borrow_and_update();
                match snap.connection {
                    ConnectionState::Connected => return Ok(()),
                    ConnectionState::Error if snap.error.is_some() => {
                        anyhow::bail!(snap.error.clone().unwrap_or_default());
                    }
                    _ => {}
                }
            }
            rx.changed().await?;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("Timed out waiting for the backend connection"))?
}

/// Follow snapshots until the turn reaches a terminal state, printing
/// stream deltas and syncing live text into the session store.
async fn stream_debate(
    rx: &mut tokio::sync::watch::Receiver<Arc<DebateState>>,
    sessions: &ConsultationStore,
) -> anyhow::Result<Arc<DebateState>> {
    let mut printed: BTreeMap<AgentId, usize> = BTreeMap::new();
    let mut last_phase = DebatePhase::Idle;
    let mut last_speaker: Option<AgentId> = None;

    loop {
        rx.changed().await?;
        let snap = rx.borrow_and_update().clone();

        if snap.phase != last_phase {
            if let Some(round) = snap.phase.round() {
                println!("\n── {} ──", round.display_name());
            }
            last_phase = snap.phase;
        }

        for record in snap.agents.values() {
            let seen = printed.entry(record.id.clone()).or_insert(0);
            if record.text.len() > *seen {
                if last_speaker.as_ref() != Some(&record.id) {
                    println!();
                    print!("{}: ", record.display_name);
                    last_speaker = Some(record.id.clone());
                }
                print!("{}", &record.text[*seen..]);
                use std::io::Write;
                let _ = std::io::stdout().flush();
                *seen = record.text.len();
                let _ = sessions.update_turn_response(&record.id, &record.text);
            }
        }

        if let Some(error) = &snap.error {
            if snap.connection == ConnectionState::Error && !snap.is_debating {
                anyhow::bail!(error.clone());
            }
            // Agent-scoped errors are surfaced but don't end the turn.
            tracing::warn!("{}", error);
        }

        if snap.phase.is_terminal() {
            println!();
            return Ok(snap);
        }
    }
}

fn parse_tier(s: &str) -> anyhow::Result<ModelTier> {
    match s {
        "fast" => Ok(ModelTier::Fast),
        "balanced" => Ok(ModelTier::Balanced),
        "deep" => Ok(ModelTier::Deep),
        other => anyhow::bail!("Unknown model tier: {} (fast|balanced|deep)", other),
    }
}

fn resolve_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(conclave_session::persist::default_data_dir)
}
