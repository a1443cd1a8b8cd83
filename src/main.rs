use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{io, time::Duration};
use tokio::sync::mpsc;

use rnovel::{
    app::{self, App, NetworkEvent},
    config::Config,
    library::Library,
    location::Location,
    logging,
    storage::{FileStore, KeyValueStore, MemoryStore},
    ui::ui,
};

fn open_store() -> Box<dyn KeyValueStore> {
    match FileStore::default_path() {
        Some(path) => Box::new(FileStore::open(path)),
        None => {
            tracing::warn!("no data directory; settings will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<NetworkEvent>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui(f, app))?;
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                        return Ok(());
                    }
                }
                Event::Resize(width, _) => app.viewport_width = width,
                _ => {}
            }
        }
        while let Ok(e) = event_rx.try_recv() {
            app.on_event(e);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let _guard = logging::init_tui();

    let source = std::env::args().nth(1).unwrap_or_else(|| config.source.clone());
    let location = Location::parse(&source)?;
    tracing::info!(%location, "opening");

    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut app = App::new(&config, location.clone(), open_store(), action_tx);
    tokio::spawn(app::run_network_loop(Library::new(location), action_rx, event_tx.clone()));
    tokio::spawn(app::run_config_watcher(event_tx));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.viewport_width = terminal.size()?.width;
    app.start();
    let result = run(&mut terminal, &mut app, &mut event_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    println!("{}", app.reader.location());
    Ok(())
}
