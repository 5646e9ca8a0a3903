use anyhow::Result;

mod app;
mod client;
mod config;
mod form;
mod handler;
mod tui;
mod ui;

use app::App;
use client::ChatClient;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = Config::write_default_if_missing();
    let config = Config::load().unwrap_or_default();
    let client = ChatClient::new(&config.resolve_endpoint());
    let mut app = App::new(client);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        // Ticks arrive every 300ms, so a finished dispatch is reaped promptly
        // even when the user is idle.
        app.poll_dispatch().await;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
