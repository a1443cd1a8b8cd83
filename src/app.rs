use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::style::Color;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::{
    catalog::{ChapterContent, ChapterDescriptor},
    config::{self, Config},
    gate::{Gate, Verdict},
    library::Library,
    location::Location,
    reader::{ChapterRequest, Reader},
    storage::KeyValueStore,
    theme::{self, Palette, Theme},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Locked,
    Reading,
    /// Chapter selector popup over the reading view.
    Selector,
    /// `:` prompt for jumping to a chapter id.
    Jump,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FetchCatalog,
    FetchChapter(ChapterRequest),
}

#[derive(Debug)]
pub enum NetworkEvent {
    CatalogLoaded(Result<Vec<ChapterDescriptor>>),
    ChapterLoaded(ChapterRequest, Result<ChapterContent>),
    AccentUpdate(Color),
}

pub async fn run_network_loop(
    library: Library,
    mut action_rx: mpsc::UnboundedReceiver<Action>,
    event_tx: mpsc::UnboundedSender<NetworkEvent>,
) {
    while let Some(action) = action_rx.recv().await {
        let library = library.clone();
        let event_tx = event_tx.clone();

        tokio::spawn(async move {
            let event = match action {
                Action::FetchCatalog => {
                    NetworkEvent::CatalogLoaded(library.fetch_catalog().await)
                }
                Action::FetchChapter(request) => {
                    let outcome = library.fetch_chapter(&request.id).await;
                    NetworkEvent::ChapterLoaded(request, outcome)
                }
            };
            let _ = event_tx.send(event);
        });
    }
}

pub async fn run_config_watcher(event_tx: mpsc::UnboundedSender<NetworkEvent>) {
    let mut last_color = config::load_accent();
    let mut interval = tokio::time::interval(Duration::from_secs(1));

    loop {
        interval.tick().await;
        let new_color = config::load_accent();
        if new_color != last_color {
            last_color = new_color;
            if event_tx.send(NetworkEvent::AccentUpdate(new_color)).is_err() {
                break;
            }
        }
    }
}

pub struct App {
    pub screen: Screen,
    pub input: String,
    pub gate_error: bool,
    pub theme: Theme,
    pub accent: Color,
    pub sidebar_focused: bool,
    pub viewport_width: u16,
    pub reader: Reader,
    gate: Gate,
    store: Box<dyn KeyValueStore>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        config: &Config,
        location: Location,
        store: Box<dyn KeyValueStore>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            screen: Screen::Locked,
            input: String::new(),
            gate_error: false,
            theme: theme::load(store.as_ref()),
            accent: config.accent(),
            sidebar_focused: false,
            viewport_width: 0,
            reader: Reader::new(location, config.render_mode(), config.narrow_width),
            gate: Gate::new(config.password_hash.clone()),
            store,
            action_tx,
        }
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette(self.accent)
    }

    /// Skips the prompt when a valid token is already stored.
    pub fn start(&mut self) {
        if self.gate.restore(self.store.as_ref()) {
            tracing::info!("stored token accepted");
            self.gate.persist(self.store.as_mut());
            self.unlock();
        }
    }

    fn unlock(&mut self) {
        self.screen = Screen::Reading;
        self.input.clear();
        self.gate_error = false;
        self.send(Action::FetchCatalog);
    }

    /// A matching attempt is persisted by the gate itself.
    fn submit_password(&mut self) {
        match self.gate.submit(&self.input, self.store.as_mut()) {
            Verdict::Unlocked => self.unlock(),
            Verdict::Rejected => {
                self.gate_error = true;
                self.input.clear();
            }
        }
    }

    fn send(&self, action: Action) {
        if self.action_tx.send(action).is_err() {
            tracing::error!("network task is gone");
        }
    }

    fn dispatch(&self, request: Option<ChapterRequest>) {
        if let Some(request) = request {
            self.send(Action::FetchChapter(request));
        }
    }

    pub fn load_chapter(&mut self, index: usize) {
        let request = self.reader.load_chapter(index);
        self.dispatch(request);
    }

    pub fn on_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::CatalogLoaded(Ok(chapters)) => {
                self.reader.set_catalog(chapters);
                if let Some(index) = self.reader.startup_index() {
                    self.load_chapter(index);
                }
            }
            NetworkEvent::CatalogLoaded(Err(e)) => {
                tracing::error!(error = ?e, "catalog load failed");
                self.reader.catalog_failed();
            }
            NetworkEvent::ChapterLoaded(request, outcome) => {
                self.reader.finish_load(&request, outcome);
            }
            NetworkEvent::AccentUpdate(color) => self.accent = color,
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = theme::toggle(self.theme, self.store.as_mut());
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.screen {
            Screen::Locked => match key {
                KeyCode::Esc => return true,
                KeyCode::Enter => self.submit_password(),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            Screen::Selector => match key {
                KeyCode::Esc | KeyCode::Char('g') => {
                    self.reader.reset_selector();
                    self.screen = Screen::Reading;
                }
                KeyCode::Char('q') => return true,
                KeyCode::Char('j') | KeyCode::Down => self.reader.selector_down(),
                KeyCode::Char('k') | KeyCode::Up => self.reader.selector_up(),
                KeyCode::Enter => {
                    let index = self.reader.selector();
                    self.load_chapter(index);
                    self.screen = Screen::Reading;
                }
                _ => {}
            },
            Screen::Jump => match key {
                KeyCode::Esc => {
                    self.input.clear();
                    self.screen = Screen::Reading;
                }
                KeyCode::Enter => {
                    let request = self.reader.jump_to(&self.input);
                    self.dispatch(request);
                    self.input.clear();
                    self.screen = Screen::Reading;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            Screen::Reading if self.sidebar_focused && self.reader.sidebar_open() => match key {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => {
                    self.reader.close_sidebar();
                    self.sidebar_focused = false;
                }
                KeyCode::Tab | KeyCode::Char('s') => {
                    self.reader.toggle_sidebar();
                    self.sidebar_focused = false;
                }
                KeyCode::Char('j') | KeyCode::Down => self.reader.sidebar_down(),
                KeyCode::Char('k') | KeyCode::Up => self.reader.sidebar_up(),
                KeyCode::Enter => {
                    let index = self.reader.sidebar_cursor();
                    let request =
                        self.reader.select_from_sidebar(index, self.viewport_width);
                    self.dispatch(request);
                    if !self.reader.sidebar_open() {
                        self.sidebar_focused = false;
                    }
                }
                KeyCode::Char('t') => self.toggle_theme(),
                _ => {}
            },
            Screen::Reading => match key {
                KeyCode::Char('q') => return true,
                KeyCode::Tab | KeyCode::Char('s') => {
                    self.reader.toggle_sidebar();
                    self.sidebar_focused = self.reader.sidebar_open();
                }
                KeyCode::Esc => self.reader.close_sidebar(),
                KeyCode::Char('t') => self.toggle_theme(),
                KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Right => {
                    let request = self.reader.next();
                    self.dispatch(request);
                }
                KeyCode::Char('h') | KeyCode::Char('p') | KeyCode::Left => {
                    let request = self.reader.prev();
                    self.dispatch(request);
                }
                KeyCode::Char('j') | KeyCode::Down => self.reader.scroll_by(1),
                KeyCode::Char('k') | KeyCode::Up => self.reader.scroll_by(-1),
                KeyCode::PageDown | KeyCode::Char(' ') => self.reader.scroll_by(20),
                KeyCode::PageUp => self.reader.scroll_by(-20),
                KeyCode::Char('g') => {
                    if !self.reader.catalog().is_empty() {
                        self.reader.reset_selector();
                        self.screen = Screen::Selector;
                    }
                }
                KeyCode::Char(':') => {
                    self.input.clear();
                    self.screen = Screen::Jump;
                }
                _ => {}
            },
        }
        false
    }
}
