use clap::Parser;
use color_eyre::Result;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::app::{App, FormOptions};
use crate::constants::TICK_RATE;
use crate::event::{Action, WorkflowEvent};
use crate::workflow::Submitter;

mod app;
mod client;
mod constants;
mod crypto;
mod draft;
mod event;
mod focus;
mod handler;
mod theme;
mod tui;
mod ui;
mod workflow;

/// Interactive terminal form for composing and sending transactions.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Node endpoint URL, prefilled into the form.
    #[arg(long)]
    endpoint: Option<String>,

    /// Keychain access seed (hex or passphrase), prefilled into the form.
    #[arg(long)]
    seed: Option<String>,

    /// Compose for a named keychain service. Hides the endpoint and seed
    /// region of the form.
    #[arg(long)]
    service: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // Logs stay off unless RUST_LOG asks for them; the terminal is in raw
    // mode while the form runs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut app = App::new(FormOptions {
        endpoint: cli.endpoint,
        seed: cli.seed,
        service_name: cli.service,
    })?;

    let (events_tx, events_rx) = mpsc::channel::<WorkflowEvent>(32);
    let submitter = Submitter::new(tokio::runtime::Handle::current(), events_tx);

    let mut tui = tui::Tui::enter()?;
    run_app(&mut tui, &mut app, &submitter, events_rx)
}

fn run_app(
    tui: &mut tui::Tui,
    app: &mut App,
    submitter: &Submitter,
    mut workflow_events: mpsc::Receiver<WorkflowEvent>,
) -> Result<()> {
    while !app.exit {
        tui.draw(|frame| ui::render(frame, app))?;

        // Results posted by background tasks are folded into the state
        // here, on the same thread that handles input.
        while let Ok(event) = workflow_events.try_recv() {
            app.update(Action::Workflow(event), submitter);
        }

        if crossterm::event::poll(TICK_RATE)? {
            let event = crossterm::event::read()?;
            if let Some(action) = handler::handle_event(app, event) {
                app.update(action, submitter);
            }
        }
    }
    Ok(())
}
