//! HTML output for reading mode.
//!
//! Phase two: walks the tree from [`parse_document`] with the registry
//! already complete, so forward references resolve. Plain markdown inside
//! paragraphs and items goes through pulldown-cmark; the constructs this
//! crate adds are swapped for placeholders first and spliced back in after.

use std::fmt::{self, Write};

use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{Options, Parser, html::push_html};

use crate::{
    labels::{anchor_for, definition_of},
    parsing::{
        extract::ReferenceTarget,
        inline::{InlineNode, InlineOptions, parse_inline},
        types::{MarkerKind, NumberStyle},
    },
    settings::ProcessingConfig,
};

use super::{
    node::{NodeKind, ParsedNode},
    parser::{ParsedDocument, parse_document},
};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Renders `source` to an HTML fragment.
pub fn render_markdown(source: &str, config: &ProcessingConfig) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_into(&mut out, source, config);
    out
}

pub fn render_into<W: Write>(out: &mut W, source: &str, config: &ProcessingConfig) -> fmt::Result {
    let doc = parse_document(source, config);
    log::debug!(
        "reading mode: {} items, {} labels",
        doc.analysis.records.len(),
        doc.registry.len()
    );
    Renderer {
        source,
        doc: &doc,
        options: InlineOptions::from(&config.settings().inline),
    }
    .node(out, &doc.root)
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES
}

fn markdown_to_html(text: &str) -> String {
    let mut html = String::new();
    push_html(&mut html, Parser::new_ext(text, markdown_options()));
    html
}

/// Removes the common leading indentation of non-blank lines.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_placeholder(markdown: &mut String, fragments: &mut Vec<String>, fragment: String) {
    let _ = write!(markdown, "{OPEN}{}{CLOSE}", fragments.len());
    fragments.push(fragment);
}

/// Appends source text. Placeholder delimiters the author typed become
/// fragments of their own, so every delimiter left in the markdown is ours.
fn push_guarded(markdown: &mut String, fragments: &mut Vec<String>, text: &str) {
    for part in text.split_inclusive([OPEN, CLOSE]) {
        match part.strip_suffix([OPEN, CLOSE]) {
            Some(before) => {
                markdown.push_str(before);
                let delimiter = &part[before.len()..];
                push_placeholder(markdown, fragments, delimiter.to_string());
            }
            None => markdown.push_str(part),
        }
    }
}

/// Replaces every placeholder in `html` with its fragment, in one pass.
fn splice(html: &str, fragments: &[String]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find(OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + OPEN.len_utf8()..];
        let found = after.find(CLOSE).and_then(|close| {
            let fragment = fragments.get(after[..close].parse::<usize>().ok()?)?;
            Some((fragment, close))
        });
        match found {
            Some((fragment, close)) => {
                out.push_str(fragment);
                rest = &after[close + CLOSE.len_utf8()..];
            }
            None => {
                out.push(OPEN);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_ordered(kind: MarkerKind, style: NumberStyle) -> bool {
    match kind {
        MarkerKind::CustomLabel | MarkerKind::Definition => false,
        MarkerKind::Standard => style != NumberStyle::Bullet,
        MarkerKind::Example | MarkerKind::Hash | MarkerKind::Fancy => true,
    }
}

struct Renderer<'a> {
    source: &'a str,
    doc: &'a ParsedDocument,
    options: InlineOptions,
}

impl Renderer<'_> {
    fn node<W: Write>(&self, out: &mut W, node: &ParsedNode) -> fmt::Result {
        match &node.kind {
            NodeKind::Document => self.children(out, node),
            NodeKind::Paragraph => {
                for child in &node.children {
                    self.block_text(out, child)?;
                }
                Ok(())
            }
            NodeKind::Text => self.block_text(out, node),
            NodeKind::Markdown => {
                out.write_str(&markdown_to_html(&dedent(node.source.slice(self.source))))
            }
            NodeKind::List { kind, style, .. } => self.list(out, node, *kind, *style),
            NodeKind::Item { record } => self.item(out, node, *record),
            NodeKind::DefinitionList => {
                out.write_str("<dl class=\"listmark-definitions\">\n")?;
                self.children(out, node)?;
                out.write_str("</dl>\n")
            }
            NodeKind::Term => {
                out.write_str("<dt>")?;
                for child in &node.children {
                    out.write_str(&self.inline(child.source.slice(self.source)).0)?;
                }
                out.write_str("</dt>\n")
            }
            NodeKind::Definition => {
                out.write_str("<dd>")?;
                self.flow(out, &node.children)?;
                out.write_str("</dd>\n")
            }
        }
    }

    fn children<W: Write>(&self, out: &mut W, node: &ParsedNode) -> fmt::Result {
        node.children.iter().try_for_each(|c| self.node(out, c))
    }

    /// A text run as its own block: wrapped in `<p>` unless markdown turned
    /// it into something else (a heading, a quote).
    fn block_text<W: Write>(&self, out: &mut W, node: &ParsedNode) -> fmt::Result {
        let (html, paragraph) = self.inline(node.source.slice(self.source));
        if paragraph {
            write!(out, "<p>{html}</p>\n")
        } else {
            out.write_str(&html)
        }
    }

    /// Item or definition body: a leading text run stays inline, later runs
    /// become blocks.
    fn flow<W: Write>(&self, out: &mut W, children: &[ParsedNode]) -> fmt::Result {
        for (i, child) in children.iter().enumerate() {
            match child.kind {
                NodeKind::Text if i == 0 => {
                    let (html, paragraph) = self.inline(child.source.slice(self.source));
                    out.write_str(&html)?;
                    if !paragraph {
                        out.write_char('\n')?;
                    }
                }
                NodeKind::Text => self.block_text(out, child)?,
                _ => {
                    if i == 0 {
                        out.write_char('\n')?;
                    }
                    self.node(out, child)?;
                }
            }
        }
        Ok(())
    }

    fn list<W: Write>(
        &self,
        out: &mut W,
        node: &ParsedNode,
        kind: MarkerKind,
        style: NumberStyle,
    ) -> fmt::Result {
        let tag = if is_ordered(kind, style) { "ol" } else { "ul" };
        write!(
            out,
            "<{tag} class=\"listmark-list listmark-{}\" data-style=\"{}\"",
            kind.as_str(),
            style.as_str()
        )?;
        let start = node.children.first().and_then(|item| match item.kind {
            NodeKind::Item { record } => self.doc.analysis.records.get(record),
            _ => None,
        });
        if let Some(first) = start
            && tag == "ol"
            && first.label.ordinal > 1
        {
            write!(out, " start=\"{}\"", first.label.ordinal)?;
        }
        out.write_str(">\n")?;
        self.children(out, node)?;
        write!(out, "</{tag}>\n")
    }

    fn item<W: Write>(&self, out: &mut W, node: &ParsedNode, record: usize) -> fmt::Result {
        let Some(rec) = self.doc.analysis.records.get(record) else {
            return self.children(out, node);
        };
        let display = encode_double_quoted_attribute(&rec.label.display);
        write!(out, "<li class=\"listmark-item\" data-label=\"{display}\"")?;
        // Only the active site of a label carries its anchor.
        if let Some((id, site)) = definition_of(rec)
            && self.doc.registry.active(&id).map(|s| s.span) == Some(site.span)
        {
            write!(out, " id=\"{}\"", encode_double_quoted_attribute(&anchor_for(&id)))?;
        }
        write!(
            out,
            "><span class=\"listmark-marker\">{}</span>",
            encode_text(&rec.label.display)
        )?;
        if !node.children.is_empty() {
            out.write_char(' ')?;
        }
        self.flow(out, &node.children)?;
        out.write_str("</li>\n")
    }

    /// Renders one text run. Returns the HTML and whether pulldown-cmark
    /// produced a single paragraph, whose `<p>` wrapper has been removed.
    fn inline(&self, text: &str) -> (String, bool) {
        let text = text
            .lines()
            .map(str::trim_start)
            .collect::<Vec<_>>()
            .join("\n");

        let mut markdown = String::with_capacity(text.len());
        let mut fragments = Vec::new();
        for node in parse_inline(0, &text, self.options) {
            let fragment = match &node {
                InlineNode::Text(sp) | InlineNode::CodeSpan { full: sp, .. } => {
                    push_guarded(&mut markdown, &mut fragments, sp.slice(&text));
                    continue;
                }
                InlineNode::LabelRef { full, label } => {
                    self.reference(full.slice(&text), ReferenceTarget::from_label_ref(label.slice(&text)))
                }
                InlineNode::ExampleRef { full, label } => self.reference(
                    full.slice(&text),
                    ReferenceTarget::from_example_ref(label.slice(&text)),
                ),
                InlineNode::Superscript { inner, .. } => {
                    format!("<sup>{}</sup>", encode_text(inner.slice(&text)))
                }
                InlineNode::Subscript { inner, .. } => {
                    format!("<sub>{}</sub>", encode_text(inner.slice(&text)))
                }
            };
            push_placeholder(&mut markdown, &mut fragments, fragment);
        }

        let html = markdown_to_html(&markdown);
        let (html, paragraph) = match html
            .strip_prefix("<p>")
            .and_then(|h| h.strip_suffix("</p>\n"))
            .filter(|inner| !inner.contains("<p>"))
        {
            Some(inner) => (inner.to_string(), true),
            None => (html, false),
        };
        (splice(&html, &fragments), paragraph)
    }

    fn reference(&self, raw: &str, target: Option<ReferenceTarget>) -> String {
        let resolved = target.map(|t| self.doc.registry.resolve(raw, &t));
        match resolved {
            Some(rec) if rec.is_resolved() => format!(
                "<a class=\"listmark-ref\" href=\"#{}\">{}</a>",
                encode_double_quoted_attribute(&rec.anchor().unwrap_or_default()),
                encode_text(rec.display.as_deref().unwrap_or(raw))
            ),
            _ => {
                log::debug!("unresolved reference {raw}");
                format!(
                    "<span class=\"listmark-ref listmark-ref-broken\">{}</span>",
                    encode_text(raw)
                )
            }
        }
    }
}
