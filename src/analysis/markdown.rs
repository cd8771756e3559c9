// src/analysis/markdown.rs
// =============================================================================
// Renders the markdown returned by the language model.
//
// Two targets:
// - HTML, through pulldown-cmark's own html writer (`--html`)
// - Plain terminal text: headings underlined, list bullets, indented code
//   blocks, links written as "text (url)"
//
// pulldown-cmark is a streaming parser, so the terminal renderer is just a
// loop over events with a little state (list nesting, pending link target).
// =============================================================================

use pulldown_cmark::{html, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

fn parser(markdown: &str) -> Parser<'_, '_> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    Parser::new_ext(markdown, options)
}

pub fn render_html(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, parser(markdown));
    out
}

pub fn render_terminal(markdown: &str) -> String {
    let mut out = String::new();
    // One entry per open list: Some(next number) for ordered lists
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut heading: Option<(HeadingLevel, usize)> = None;
    let mut link_target: Option<String> = None;
    let mut in_code_block = false;

    for event in parser(markdown) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                ensure_blank_line(&mut out);
                heading = Some((level, out.len()));
            }
            Event::End(Tag::Heading(..)) => {
                if let Some((level, start)) = heading.take() {
                    let width = out[start..].chars().count();
                    let rule = if level == HeadingLevel::H1 { '=' } else { '-' };
                    out.push('\n');
                    out.extend(std::iter::repeat(rule).take(width));
                    out.push('\n');
                }
            }
            Event::Start(Tag::Paragraph) => {
                if lists.is_empty() {
                    ensure_blank_line(&mut out);
                }
            }
            Event::End(Tag::Paragraph) => {
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::List(first)) => {
                if lists.is_empty() {
                    ensure_blank_line(&mut out);
                } else if !out.ends_with('\n') {
                    out.push('\n');
                }
                lists.push(first);
            }
            Event::End(Tag::List(_)) => {
                lists.pop();
            }
            Event::Start(Tag::Item) => {
                let depth = lists.len().saturating_sub(1);
                out.push_str(&"  ".repeat(depth));
                match lists.last_mut() {
                    Some(Some(number)) => {
                        out.push_str(&format!("{number}. "));
                        *number += 1;
                    }
                    _ => out.push_str("• "),
                }
            }
            Event::End(Tag::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                ensure_blank_line(&mut out);
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        out.push_str(&format!("    [{lang}]\n"));
                    }
                }
                in_code_block = true;
            }
            Event::End(Tag::CodeBlock(_)) => {
                in_code_block = false;
            }
            Event::Start(Tag::Link(_, dest, _)) => {
                link_target = Some(dest.to_string());
            }
            Event::End(Tag::Link(..)) => {
                if let Some(dest) = link_target.take() {
                    out.push_str(&format!(" ({dest})"));
                }
            }
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    out.push_str("    ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Event::Text(text) => out.push_str(&text),
            Event::Code(code) => {
                out.push('`');
                out.push_str(&code);
                out.push('`');
            }
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_blank_line(&mut out);
                out.push_str(&"─".repeat(40));
                out.push('\n');
            }
            _ => {}
        }
    }

    out.trim_end().to_string() + "\n"
}

// Starts a new block: a blank line after previous output, nothing at the top
fn ensure_blank_line(out: &mut String) {
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    if out.ends_with('\n') {
        out.push('\n');
    } else {
        out.push_str("\n\n");
    }
}
