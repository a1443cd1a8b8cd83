//! Chapter text to ratatui lines.
//!
//! Styles here only carry modifiers; colors come from the active palette when
//! the lines are drawn, so a theme switch needs no re-render.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Markdown,
    /// Blank-line separated paragraphs, nothing else.
    Plain,
}

pub fn render(content: &str, mode: RenderMode) -> Vec<Line<'static>> {
    match mode {
        RenderMode::Markdown => markdown_to_lines(content),
        RenderMode::Plain => paragraphs_to_lines(content),
    }
}

/// Splits on blank lines; each block is one paragraph with its whitespace
/// collapsed.
pub fn paragraphs_to_lines(content: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in content.split("\n\n") {
        let text = block.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::raw(text));
    }
    lines
}

pub fn markdown_to_lines(md: &str) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut styles: Vec<Style> = vec![Style::default()];

    let mut in_code_block = false;
    let mut list_depth: usize = 0;
    let mut quote_depth: usize = 0;

    for event in Parser::new_ext(md, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(&mut current, &mut lines);
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if level == pulldown_cmark::HeadingLevel::H1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                styles.push(style);
            }
            Event::End(TagEnd::Heading(_)) => {
                styles.pop();
                flush(&mut current, &mut lines);
                lines.push(Line::raw(""));
            }

            Event::Start(Tag::Strong) => push_modifier(&mut styles, Modifier::BOLD),
            Event::Start(Tag::Emphasis) => push_modifier(&mut styles, Modifier::ITALIC),
            Event::Start(Tag::Strikethrough) => {
                push_modifier(&mut styles, Modifier::CROSSED_OUT)
            }
            Event::Start(Tag::Link { .. }) => push_modifier(&mut styles, Modifier::UNDERLINED),
            Event::End(
                TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough | TagEnd::Link,
            ) => {
                styles.pop();
            }

            Event::Code(code) => {
                current.push(Span::styled(
                    code.to_string(),
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
            }

            Event::Start(Tag::CodeBlock(_)) => {
                flush(&mut current, &mut lines);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::raw(""));
            }

            Event::Start(Tag::List(_)) => {
                flush(&mut current, &mut lines);
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    lines.push(Line::raw(""));
                }
            }
            Event::Start(Tag::Item) => {
                flush(&mut current, &mut lines);
                let indent = "  ".repeat(list_depth.saturating_sub(1));
                current.push(Span::raw(format!("{indent}• ")));
            }
            Event::End(TagEnd::Item) => flush(&mut current, &mut lines),

            Event::Start(Tag::BlockQuote) => {
                flush(&mut current, &mut lines);
                quote_depth += 1;
                push_modifier(&mut styles, Modifier::ITALIC);
            }
            Event::End(TagEnd::BlockQuote) => {
                flush(&mut current, &mut lines);
                quote_depth = quote_depth.saturating_sub(1);
                styles.pop();
            }

            Event::Start(Tag::Paragraph) => {
                if quote_depth > 0 {
                    current.push(Span::styled(
                        "│ ".repeat(quote_depth),
                        Style::default().add_modifier(Modifier::DIM),
                    ));
                }
            }
            Event::End(TagEnd::Paragraph) => {
                flush(&mut current, &mut lines);
                if list_depth == 0 {
                    lines.push(Line::raw(""));
                }
            }

            Event::Text(text) => {
                if in_code_block {
                    for code_line in text.lines() {
                        lines.push(Line::styled(
                            format!("    {code_line}"),
                            Style::default().add_modifier(Modifier::DIM),
                        ));
                    }
                } else {
                    current.push(Span::styled(text.to_string(), top(&styles)));
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                current.push(Span::styled(html.to_string(), top(&styles)));
            }
            Event::SoftBreak => current.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut current, &mut lines),

            Event::Rule => {
                flush(&mut current, &mut lines);
                let rule = Style::default().add_modifier(Modifier::DIM);
                lines.push(Line::styled("─".repeat(40), rule));
                lines.push(Line::raw(""));
            }

            _ => {}
        }
    }

    flush(&mut current, &mut lines);
    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }
    lines
}

/// Rows needed to show `lines` at `width` columns once wrapped.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| {
            let text = line.to_string();
            if text.is_empty() { 1 } else { textwrap::wrap(&text, width).len().max(1) }
        })
        .sum()
}

fn flush(spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>) {
    if !spans.is_empty() {
        lines.push(Line::from(std::mem::take(spans)));
    }
}

fn top(styles: &[Style]) -> Style {
    styles.last().copied().unwrap_or_default()
}

fn push_modifier(styles: &mut Vec<Style>, modifier: Modifier) {
    let base = top(styles);
    styles.push(base.add_modifier(modifier));
}
