//! Reading session: catalog, current chapter, and the state mirrored from it
//! (title, body, side panel highlight, selector value, nav bindings, location).

use anyhow::Result;
use ratatui::text::Line;

use crate::{
    catalog::{Catalog, ChapterContent, ChapterDescriptor, ChapterId},
    location::Location,
    render::{self, RenderMode},
};

pub const LOADING_TEXT: &str = "Loading...";
pub const LOAD_ERROR_TEXT: &str = "Error loading content.";

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Loading,
    Ready(Vec<Line<'static>>),
    Failed,
}

/// A chapter fetch handed to the network task. Only the request with the
/// latest ticket is applied when it comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRequest {
    pub index: usize,
    pub id: ChapterId,
    pub ticket: u64,
}

/// Prev/next enabled state, as of the last finished load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigation {
    pub prev: bool,
    pub next: bool,
}

impl Navigation {
    pub fn around(index: usize, len: usize) -> Self {
        Self { prev: index > 0, next: index + 1 < len }
    }
}

#[derive(Debug)]
pub struct Reader {
    catalog: Catalog,
    current: Option<usize>,
    title: String,
    body: Body,
    location: Location,
    nav: Navigation,
    scroll: u16,
    sidebar_open: bool,
    sidebar_cursor: usize,
    selector: usize,
    catalog_settled: bool,
    mode: RenderMode,
    narrow_width: u16,
    issued: u64,
}

impl Reader {
    pub fn new(location: Location, mode: RenderMode, narrow_width: u16) -> Self {
        Self {
            catalog: Catalog::default(),
            current: None,
            title: String::new(),
            body: Body::Empty,
            location,
            nav: Navigation::default(),
            scroll: 0,
            sidebar_open: false,
            sidebar_cursor: 0,
            selector: 0,
            catalog_settled: false,
            mode,
            narrow_width,
            issued: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn nav(&self) -> Navigation {
        self.nav
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn sidebar_cursor(&self) -> usize {
        self.sidebar_cursor
    }

    pub fn selector(&self) -> usize {
        self.selector
    }

    /// False until the catalog fetch has either delivered or failed.
    pub fn catalog_settled(&self) -> bool {
        self.catalog_settled
    }

    /// Records a failed catalog fetch; the catalog stays empty.
    pub fn catalog_failed(&mut self) {
        self.catalog_settled = true;
    }

    /// Replaces the catalog wholesale.
    pub fn set_catalog(&mut self, chapters: Vec<ChapterDescriptor>) {
        self.catalog = Catalog::new(chapters);
        self.catalog_settled = true;
        if self.current.is_some_and(|i| i >= self.catalog.len()) {
            self.current = None;
            self.nav = Navigation::default();
        }
        self.sidebar_cursor = self.sidebar_cursor.min(self.catalog.len().saturating_sub(1));
        self.selector = self.selector.min(self.catalog.len().saturating_sub(1));
        tracing::info!(chapters = self.catalog.len(), "catalog loaded");
    }

    /// Chapter to open once the catalog is in: the deep-linked one if the
    /// location names a chapter (nothing when it matches no descriptor),
    /// otherwise the first.
    pub fn startup_index(&self) -> Option<usize> {
        match self.location.chapter() {
            Some(raw) => {
                let found = self.catalog.position_of(&raw);
                if found.is_none() {
                    tracing::warn!(chapter = %raw, "deep-linked chapter not in catalog");
                }
                found
            }
            None if !self.catalog.is_empty() => Some(0),
            None => None,
        }
    }

    /// Starts loading `index`. Out of range is a no-op that touches nothing.
    pub fn load_chapter(&mut self, index: usize) -> Option<ChapterRequest> {
        let chapter = self.catalog.get(index)?.clone();
        self.current = Some(index);
        self.title = chapter.title;
        self.body = Body::Loading;
        self.sidebar_cursor = index;
        self.selector = index;
        self.issued += 1;
        tracing::debug!(index, id = %chapter.id, ticket = self.issued, "loading chapter");
        Some(ChapterRequest { index, id: chapter.id, ticket: self.issued })
    }

    /// Applies a finished fetch. Returns false, changing nothing, when a newer
    /// request has been issued since.
    pub fn finish_load(
        &mut self,
        request: &ChapterRequest,
        outcome: Result<ChapterContent>,
    ) -> bool {
        if request.ticket != self.issued {
            tracing::debug!(
                ticket = request.ticket,
                latest = self.issued,
                "dropping stale chapter"
            );
            return false;
        }
        match outcome {
            Ok(chapter) => {
                self.body = Body::Ready(render::render(&chapter.content, self.mode));
                self.location.set_chapter(&request.id);
                self.scroll = 0;
            }
            Err(e) => {
                tracing::error!(id = %request.id, error = ?e, "chapter load failed");
                self.body = Body::Failed;
            }
        }
        self.nav = Navigation::around(request.index, self.catalog.len());
        true
    }

    /// Loads the chapter after the current one. Whether the move is allowed
    /// comes from the last finished load; the target follows the current
    /// index, so repeated presses keep advancing while a fetch is pending.
    pub fn next(&mut self) -> Option<ChapterRequest> {
        if !self.nav.next {
            return None;
        }
        let target = self.current? + 1;
        self.load_chapter(target)
    }

    pub fn prev(&mut self) -> Option<ChapterRequest> {
        if !self.nav.prev {
            return None;
        }
        let target = self.current?.checked_sub(1)?;
        self.load_chapter(target)
    }

    pub fn jump_to(&mut self, raw_id: &str) -> Option<ChapterRequest> {
        let index = self.catalog.position_of(raw_id.trim())?;
        self.load_chapter(index)
    }

    /// Loads a side panel entry; narrow terminals close the panel afterwards.
    pub fn select_from_sidebar(
        &mut self,
        index: usize,
        viewport_width: u16,
    ) -> Option<ChapterRequest> {
        let request = self.load_chapter(index);
        if viewport_width <= self.narrow_width {
            self.sidebar_open = false;
        }
        request
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        if self.sidebar_open {
            if let Some(i) = self.current {
                self.sidebar_cursor = i;
            }
        }
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    pub fn sidebar_down(&mut self) {
        if self.sidebar_cursor + 1 < self.catalog.len() {
            self.sidebar_cursor += 1;
        }
    }

    pub fn sidebar_up(&mut self) {
        self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
    }

    pub fn selector_down(&mut self) {
        if self.selector + 1 < self.catalog.len() {
            self.selector += 1;
        }
    }

    pub fn selector_up(&mut self) {
        self.selector = self.selector.saturating_sub(1);
    }

    /// Puts the selector back on the chapter on screen.
    pub fn reset_selector(&mut self) {
        self.selector = self.current.unwrap_or(0);
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let target = i32::from(self.scroll) + delta;
        self.scroll = target.clamp(0, i32::from(u16::MAX)) as u16;
    }

    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll = self.scroll.min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn descriptors(json: &str) -> Vec<ChapterDescriptor> {
        serde_json::from_str(json).unwrap()
    }

    fn reader_at(url: &str) -> Reader {
        let mut r = Reader::new(Location::parse(url).unwrap(), RenderMode::Plain, 80);
        r.set_catalog(descriptors(r#"[{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]"#));
        r
    }

    fn reader() -> Reader {
        reader_at("https://example.com/novel/")
    }

    fn content(text: &str) -> Result<ChapterContent> {
        Ok(ChapterContent { content: text.to_string() })
    }

    #[test]
    fn out_of_range_load_is_a_noop() {
        let mut r = reader();
        let req = r.load_chapter(0).unwrap();
        r.finish_load(&req, content("one"));
        let snapshot = |r: &Reader| {
            (r.current(), r.title().to_string(), r.body().clone(), r.location().clone(), r.nav())
        };
        let before = snapshot(&r);

        for index in [2, 3, usize::MAX] {
            assert_eq!(r.load_chapter(index), None);
        }
        assert_eq!(before, snapshot(&r));
    }

    #[test]
    fn load_sets_title_and_loading_before_fetch() {
        let mut r = reader();
        let req = r.load_chapter(1).unwrap();
        assert_eq!(req.id.as_str(), "2");
        assert_eq!(r.current(), Some(1));
        assert_eq!(r.title(), "B");
        assert_eq!(r.body(), &Body::Loading);
        assert_eq!(r.sidebar_cursor(), 1);
        assert_eq!(r.selector(), 1);
        assert_eq!(r.location().chapter(), None);
    }

    #[test]
    fn success_syncs_location_and_nav() {
        let mut r = reader();
        r.scroll_by(12);
        let req = r.load_chapter(0).unwrap();
        assert!(r.finish_load(&req, content("Hello\n\nWorld")));

        assert_eq!(r.location().chapter().as_deref(), Some("1"));
        assert_eq!(r.scroll(), 0);
        assert_eq!(r.nav(), Navigation { prev: false, next: true });
        match r.body() {
            Body::Ready(lines) => assert_eq!(lines.len(), 3),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn next_then_prev_walks_the_catalog() {
        let mut r = reader();
        let req = r.load_chapter(0).unwrap();
        r.finish_load(&req, content("a"));

        assert_eq!(r.prev(), None);
        assert_eq!(r.current(), Some(0));

        let req = r.next().unwrap();
        assert_eq!(req.index, 1);
        r.finish_load(&req, content("b"));
        assert_eq!(r.location().chapter().as_deref(), Some("2"));
        assert_eq!(r.nav(), Navigation { prev: true, next: false });
        assert_eq!(r.next(), None);

        let req = r.prev().unwrap();
        assert_eq!(req.index, 0);
    }

    #[test]
    fn failure_keeps_previous_location() {
        let mut r = reader();
        let req = r.load_chapter(0).unwrap();
        r.finish_load(&req, content("a"));

        let req = r.load_chapter(1).unwrap();
        assert!(r.finish_load(&req, Err(anyhow!("404"))));
        assert_eq!(r.body(), &Body::Failed);
        assert_eq!(r.title(), "B");
        assert_eq!(r.current(), Some(1));
        assert_eq!(r.location().chapter().as_deref(), Some("1"));
        assert_eq!(r.nav(), Navigation { prev: true, next: false });
    }

    #[test]
    fn stale_result_is_dropped() {
        let mut r = reader();
        let first = r.load_chapter(0).unwrap();
        let second = r.load_chapter(1).unwrap();

        assert!(r.finish_load(&second, content("b")));
        assert!(!r.finish_load(&first, content("a")));
        assert_eq!(r.current(), Some(1));
        assert_eq!(r.location().chapter().as_deref(), Some("2"));
    }

    #[test]
    fn startup_follows_deep_link() {
        assert_eq!(reader().startup_index(), Some(0));
        assert_eq!(reader_at("https://example.com/?chapter=2").startup_index(), Some(1));
        assert_eq!(reader_at("https://example.com/?chapter=9").startup_index(), None);

        let location = Location::parse("https://example.com/").unwrap();
        let empty = Reader::new(location, RenderMode::Plain, 80);
        assert_eq!(empty.startup_index(), None);
    }

    #[test]
    fn empty_catalog_makes_navigation_inert() {
        let location = Location::parse("https://example.com/").unwrap();
        let mut r = Reader::new(location, RenderMode::Plain, 80);
        assert_eq!(r.load_chapter(0), None);
        assert_eq!(r.next(), None);
        assert_eq!(r.prev(), None);
        assert_eq!(r.jump_to("1"), None);
        assert_eq!(r.current(), None);
    }

    #[test]
    fn sidebar_selection_closes_panel_on_narrow_terminals() {
        let mut r = reader();
        r.toggle_sidebar();
        assert!(r.select_from_sidebar(1, 120).is_some());
        assert!(r.sidebar_open());

        assert!(r.select_from_sidebar(0, 80).is_some());
        assert!(!r.sidebar_open());
    }

    #[test]
    fn next_follows_current_index_while_loading() {
        let mut r = reader();
        r.set_catalog(descriptors(
            r#"[{"id": 1, "title": "A"}, {"id": 2, "title": "B"}, {"id": 3, "title": "C"}]"#,
        ));
        let req = r.load_chapter(0).unwrap();
        r.finish_load(&req, content("a"));

        let first = r.next().unwrap();
        let second = r.next().unwrap();
        assert_eq!((first.index, second.index), (1, 2));
        assert_eq!(r.current(), Some(2));
        assert_eq!(r.title(), "C");

        assert!(!r.finish_load(&first, content("b")));
        assert!(r.finish_load(&second, content("c")));
        assert_eq!(r.next(), None);
        assert_eq!(r.prev().map(|req| req.index), Some(1));
    }

    #[test]
    fn catalog_settles_on_arrival_or_failure() {
        let location = Location::parse("https://example.com/").unwrap();
        let mut r = Reader::new(location, RenderMode::Plain, 80);
        assert!(!r.catalog_settled());
        r.catalog_failed();
        assert!(r.catalog_settled());
        assert!(r.catalog().is_empty());

        assert!(reader().catalog_settled());
    }

    #[test]
    fn jump_uses_loose_ids() {
        let mut r = reader();
        assert_eq!(r.jump_to(" 02 ").map(|req| req.index), Some(1));
        assert_eq!(r.jump_to("nope"), None);
        assert_eq!(r.current(), Some(1));
    }

    #[test]
    fn shorter_catalog_drops_current() {
        let mut r = reader();
        r.load_chapter(1);
        r.set_catalog(descriptors(r#"[{"id": 1, "title": "A"}]"#));
        assert_eq!(r.current(), None);
    }
}
