use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use bridge_client::{BackendConfig, ConfigParamsBuilder, ParamsConfig, StreamClient};
use bridge_session::{ObserverEvent, Orchestrator, TaskOutcome};
use bridge_tools::ToolExecutor;

/// Run one remote agent task from the terminal. Backend events are printed
/// as JSON lines; stdin lines answer pending questions; ctrl+c aborts.
#[derive(Parser)]
#[command(name = "skybridge", version)]
struct Args {
    /// Task description sent to the backend
    question: String,

    /// Backend base URL (overrides SKYBRIDGE_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Model identifier forwarded to the backend
    #[arg(long, default_value = "default")]
    model: String,

    /// Workspace root for delegated file and shell operations
    /// (defaults to the current directory)
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Preferred response language
    #[arg(long)]
    language: Option<String>,

    /// Local browser debug port advertised to the backend
    #[arg(long)]
    browser_port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut backend_config = BackendConfig::from_env();
    if let Some(url) = args.base_url {
        backend_config.base_url = url;
    }

    let workspace = args
        .workspace
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    let params = ParamsConfig {
        model: args.model,
        language: args.language,
        browser_port: args.browser_port,
        ..Default::default()
    };

    let (observer_tx, mut observer_rx) = broadcast::channel::<ObserverEvent>(1024);
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(StreamClient::new(backend_config)),
        Arc::new(ToolExecutor::new(workspace)),
        Arc::new(ConfigParamsBuilder::new(params)),
        observer_tx,
    ));

    tracing::info!("starting task");

    let printer = tokio::spawn(pump_events(observer_rx, |line| println!("{line}")));

    let stdin_task = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                orchestrator.submit_human_reply(line.trim());
            }
        })
    };

    let interrupt_task = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, aborting task");
                orchestrator.abort_task().await;
            }
        })
    };

    let outcome = orchestrator.start_task(&args.question, Vec::new()).await;

    stdin_task.abort();
    interrupt_task.abort();
    // Dropping the last orchestrator handle closes the observer channel,
    // letting the printer flush and exit.
    drop(orchestrator);
    let _ = printer.await;

    let code = match outcome {
        TaskOutcome::Completed => 0,
        TaskOutcome::Errored => 1,
        TaskOutcome::Aborted => 130,
    };
    std::process::exit(code);
}

/// Drain observer events into the output sink until the channel closes.
/// A lagged receiver skips the missed events but keeps draining; only a
/// closed channel ends the pump.
async fn pump_events(mut rx: broadcast::Receiver<ObserverEvent>, mut out: impl FnMut(String)) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => out(line),
                Err(e) => tracing::warn!(error = %e, "unserializable observer event"),
            },
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "observer channel lagged, events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
