//! `deckctl`: drive a Deckbridge server from the terminal.

use std::sync::Arc;

use clap::Parser;
use deckbridge_cli::{CliError, DesktopBridge, Options, Outcome, Shell, commands, render};
use deckbridge_client::{DeckClient, Subscription, SubscriptionError, SystemEnv, WsTransport};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let options = Options::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.log)),
        )
        .init();

    let config = options.client_config()?;
    let bridge = DesktopBridge::open(
        &options.data,
        DesktopBridge::display(options.width, options.height),
    )?;

    let client =
        DeckClient::builder(config, WsTransport, SystemEnv).bridge(Arc::new(bridge)).build()?;
    let printer = tokio::spawn(print_events(client.subscribe()));

    // A failed first attempt keeps retrying in the background
    if let Err(e) = client.initialize().await {
        warn!(error = %e, "initial connection failed");
    }

    let shell = Shell::new(client.clone());
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match shell.execute(commands::parse(&line)).await {
            Outcome::Print(text) => write_line(&mut stdout, &text).await?,
            Outcome::Silent => {},
            Outcome::Quit => break,
        }
    }

    client.disconnect().await;
    printer.abort();
    info!("bye");
    Ok(())
}

async fn print_events(mut events: Subscription) {
    let mut stdout = tokio::io::stdout();

    loop {
        let line = match events.recv().await {
            Ok(event) => render::event(&event),
            Err(SubscriptionError::Lagged(missed)) => format!("! missed {missed} events"),
            Err(SubscriptionError::Closed) => return,
        };
        if write_line(&mut stdout, &line).await.is_err() {
            return;
        }
    }
}

async fn write_line(stdout: &mut Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
