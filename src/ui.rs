use ratatui::{prelude::*, widgets::*};

use crate::{
    app::{App, Screen},
    reader::{Body, LOAD_ERROR_TEXT, LOADING_TEXT},
    render,
    theme::Palette,
};

const SIDEBAR_WIDTH: u16 = 32;

pub fn ui(f: &mut Frame, app: &mut App) {
    let palette = app.palette();
    f.render_widget(Block::default().style(palette.base()), f.area());

    match app.screen {
        Screen::Locked => render_gate(f, app, &palette),
        Screen::Reading | Screen::Selector | Screen::Jump => {
            render_reader(f, app, &palette);
            if app.screen == Screen::Selector {
                render_selector(f, app, &palette);
            }
        }
    }
}

fn border<'a>(title: &str, palette: &Palette, focused: bool) -> Block<'a> {
    let color = if focused { palette.accent } else { palette.muted };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(format!(" {} ", title), Style::default().fg(palette.accent)))
        .style(palette.base())
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_gate(f: &mut Frame, app: &App, palette: &Palette) {
    let area = centered(f.area(), 44, 7);
    let masked = "•".repeat(app.input.chars().count());
    let mut lines = vec![
        Line::from(Span::styled("Enter password", palette.title())),
        Line::from(""),
        Line::from(Span::styled(format!("> {}", masked), Style::default().fg(palette.fg))),
    ];
    if app.gate_error {
        let error = Style::default().fg(palette.error);
        lines.push(Line::from(Span::styled("Incorrect password", error)));
    }
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(border("Locked", palette, true)),
        area,
    );
}

fn render_reader(f: &mut Frame, app: &mut App, palette: &Palette) {
    let rows = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(f.area());
    let (main_area, status_area) = (rows[0], rows[1]);

    let content_area = if app.reader.sidebar_open() {
        let cols = Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(main_area);
        render_sidebar(f, app, palette, cols[0]);
        cols[1]
    } else {
        main_area
    };

    render_content(f, app, palette, content_area);

    if app.screen == Screen::Jump {
        let prompt = Style::default().fg(palette.accent).bg(palette.bg);
        f.render_widget(Paragraph::new(format!(":{}", app.input)).style(prompt), status_area);
    } else {
        render_status(f, app, palette, status_area);
    }
}

fn render_sidebar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let current = app.reader.current();
    let items: Vec<ListItem> = app
        .reader
        .catalog()
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let style = if Some(i) == current { palette.title() } else { palette.base() };
            ListItem::new(format!(" {} ", chapter.title)).style(style)
        })
        .collect();

    let focused = app.sidebar_focused;
    let list = List::new(items)
        .block(border("Contents", palette, focused))
        .highlight_style(if focused { palette.highlight() } else { Style::default() });
    let mut state = ListState::default().with_selected(Some(app.reader.sidebar_cursor()));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_content(f: &mut Frame, app: &mut App, palette: &Palette, area: Rect) {
    let reader = &app.reader;
    let title = if reader.title().is_empty() { "rnovel" } else { reader.title() };
    let selector = reader
        .current()
        .and_then(|i| reader.catalog().selector_label(i))
        .map(|label| format!(" {label} ▾ "))
        .unwrap_or_default();

    let block = border(title, palette, !app.sidebar_focused)
        .title(Line::from(Span::styled(selector, palette.dim())).right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text_area = inner.inner(Margin::new(1, 0));
    let (paragraph, max_scroll) = match reader.body() {
        Body::Empty => {
            let msg = if !reader.catalog_settled() {
                LOADING_TEXT
            } else if reader.catalog().is_empty() {
                "No chapters."
            } else {
                ""
            };
            (Paragraph::new(msg).alignment(Alignment::Center).style(palette.dim()), 0)
        }
        Body::Loading => {
            let paragraph =
                Paragraph::new(LOADING_TEXT).alignment(Alignment::Center).style(palette.dim());
            (paragraph, 0)
        }
        Body::Failed => {
            let error = Style::default().fg(palette.error);
            (Paragraph::new(LOAD_ERROR_TEXT).style(error), 0)
        }
        Body::Ready(lines) => {
            let height = render::wrapped_height(lines, text_area.width);
            let max_scroll = height.saturating_sub(usize::from(text_area.height));
            let paragraph = Paragraph::new(lines.clone())
                .style(palette.base())
                .wrap(Wrap { trim: false });
            (paragraph, u16::try_from(max_scroll).unwrap_or(u16::MAX))
        }
    };

    app.reader.clamp_scroll(max_scroll);
    f.render_widget(paragraph.scroll((app.reader.scroll(), 0)), text_area);
}

fn render_status(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let nav = app.reader.nav();
    let button = |label: &'static str, enabled: bool| {
        if enabled {
            Span::styled(label, palette.highlight())
        } else {
            Span::styled(label, Style::default().fg(palette.muted).add_modifier(Modifier::DIM))
        }
    };
    let line = Line::from(vec![
        button(" [h] Prev ", nav.prev),
        Span::raw(" "),
        button(" [l] Next ", nav.next),
        Span::styled(
            "  s: contents  g: chapter  t: theme  q: quit  ",
            palette.dim(),
        ),
        Span::styled(app.reader.location().to_string(), palette.dim()),
    ]);
    f.render_widget(Paragraph::new(line).style(palette.base()), area);
}

fn render_selector(f: &mut Frame, app: &App, palette: &Palette) {
    let catalog = app.reader.catalog();
    let height = u16::try_from(catalog.len()).unwrap_or(u16::MAX).saturating_add(2).min(20);
    let area = centered(f.area(), 24, height);

    let items: Vec<ListItem> = (0..catalog.len())
        .filter_map(|i| catalog.selector_label(i))
        .map(|label| ListItem::new(format!(" {} ", label)))
        .collect();
    let list = List::new(items)
        .block(border("Chapter", palette, true))
        .highlight_style(palette.highlight());
    let mut state = ListState::default().with_selected(Some(app.reader.selector()));

    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}
