use std::env;
use std::io;
use std::process::ExitCode;

use eventpulse::catalog::{default_event, event_from_query};
use eventpulse::script::{read_actions, write_breakdown};
use eventpulse::{BookingFlow, Config, ConfirmationView, MemoryStore, Navigation};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        error!("usage: eventpulse <session.csv> [?event=<id>]");
        return ExitCode::FAILURE;
    };
    let event = args
        .next()
        .map(|query| event_from_query(&query))
        .unwrap_or_else(default_event);

    if !path.ends_with(".csv") {
        warn!(path, "session file seems to not be a csv file");
    }

    let actions = match read_actions(path.clone()) {
        Ok(actions) => actions,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = Config::from_env();
    let mut flow = BookingFlow::new(config, event, MemoryStore::new());
    let (action_sender, action_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in actions {
            match result {
                Ok(action) => {
                    if action_sender.send(action).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    flow.run(ReceiverStream::new(action_receiver)).await;

    if flow.navigation() != Some(Navigation::Confirmation) {
        warn!(step = ?flow.step(), "session ended without a confirmed booking");
        return ExitCode::SUCCESS;
    }

    let view = ConfirmationView::load(flow.store());
    let breakdown = view.breakdown(flow.catalog());
    if let Err(e) = write_breakdown(io::stdout().lock(), &breakdown) {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
