//! Terminal live preview: the document with live decorations applied, a
//! movable cursor and simple editing.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use listmark_engine::{
    Cmd, Decoration, DecorationKind, Document, LivePipeline, ProcessingConfig, Widget,
    live::MarkKind, suggest_next_marker,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    io::{Stdout, stdout},
    path::PathBuf,
};

struct App {
    path: PathBuf,
    doc: Document,
    pipeline: LivePipeline,
    /// First visible line.
    top: usize,
    status: String,
}

impl App {
    fn new(path: PathBuf, source: &str, config: ProcessingConfig) -> Result<Self> {
        let mut doc = Document::from_bytes(source.as_bytes())?;
        doc.set_selection(0..0);
        Ok(Self {
            path,
            doc,
            pipeline: LivePipeline::new(config),
            top: 0,
            status: String::new(),
        })
    }

    /// Brings the decorations up to date for the visible lines.
    fn refresh(&mut self, height: usize) -> Result<()> {
        let line = self.doc.line_of(self.doc.cursor());
        if line < self.top {
            self.top = line;
        } else if height > 0 && line >= self.top + height {
            self.top = line + 1 - height;
        }
        self.pipeline.set_viewport(self.top..self.top + height);
        self.pipeline.set_cursor(Some(self.doc.cursor()));
        let diff = self.pipeline.process(&self.doc)?;
        log::debug!(
            "revision {}: {} blocks updated",
            diff.revision,
            diff.updated.len()
        );
        Ok(())
    }

    fn move_to(&mut self, offset: usize) {
        self.doc.set_selection(offset..offset);
    }

    fn insert(&mut self, text: &str) {
        let at = self.doc.cursor();
        self.doc.apply(Cmd::InsertText {
            at,
            text: text.to_string(),
        });
        self.move_to(at + text.len());
    }

    /// New line continuing the list the cursor is in.
    fn newline(&mut self) {
        let line = self.doc.line_of(self.doc.cursor());
        let marker = self
            .pipeline
            .analysis()
            .and_then(|analysis| suggest_next_marker(analysis, line));
        match marker {
            Some(m) => self.insert(&format!("\n{}{} ", " ".repeat(m.indent), m.text)),
            None => self.insert("\n"),
        }
    }

    fn backspace(&mut self) {
        let at = self.doc.cursor();
        let text = self.doc.text();
        if let Some(prev) = prev_boundary(&text, at) {
            self.doc.apply(Cmd::DeleteRange { range: prev..at });
            self.move_to(prev);
        }
    }

    fn left(&mut self) {
        if let Some(prev) = prev_boundary(&self.doc.text(), self.doc.cursor()) {
            self.move_to(prev);
        }
    }

    fn right(&mut self) {
        if let Some(next) = next_boundary(&self.doc.text(), self.doc.cursor()) {
            self.move_to(next);
        }
    }

    /// Moves one line up or down, keeping the byte column where possible.
    fn vertical(&mut self, down: bool) {
        let at = self.doc.cursor();
        let line = self.doc.line_of(at);
        let column = at - self.doc.offset_of_line(line);
        let target = if down {
            line + 1
        } else if line == 0 {
            return;
        } else {
            line - 1
        };
        let lines = self.doc.lines();
        let Some(target_line) = lines.get(target) else {
            return;
        };
        let text = self.doc.text();
        let mut offset = (target_line.content.start + column).min(target_line.content.end);
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.move_to(offset);
    }

    fn indent(&mut self, outdent: bool) {
        let at = self.doc.cursor();
        let cmd = if outdent {
            Cmd::OutdentLines {
                range: at..at,
                width: 2,
            }
        } else {
            Cmd::IndentLines {
                range: at..at,
                width: 2,
            }
        };
        let patch = self.doc.apply(cmd);
        self.doc.set_selection(patch.new_selection);
    }

    fn save(&mut self) -> Result<()> {
        std::fs::write(&self.path, self.doc.to_bytes())?;
        self.status = format!("saved {}", self.path.display());
        log::info!("{}", self.status);
        Ok(())
    }

    /// Handles one key; returns false to quit.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Ok(false),
            KeyCode::Char('q') if ctrl => return Ok(false),
            KeyCode::Char('s') if ctrl => self.save()?,
            KeyCode::Char(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            KeyCode::Enter => self.newline(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Up => self.vertical(false),
            KeyCode::Down => self.vertical(true),
            KeyCode::Tab => self.indent(false),
            KeyCode::BackTab => self.indent(true),
            _ => {}
        }
        Ok(true)
    }
}

fn prev_boundary(text: &str, at: usize) -> Option<usize> {
    text.get(..at)?.char_indices().next_back().map(|(i, _)| i)
}

fn next_boundary(text: &str, at: usize) -> Option<usize> {
    let c = text.get(at..)?.chars().next()?;
    Some(at + c.len_utf8())
}

fn widget_style(widget: &Widget) -> Style {
    match widget {
        Widget::ListMarker { .. } | Widget::DefinitionBullet => Style::default().fg(Color::Cyan),
        Widget::ExampleNumber { .. } => Style::default().fg(Color::Green),
        Widget::CustomLabel { .. } => Style::default().fg(Color::Magenta),
        Widget::Reference { stale: false, .. } => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        Widget::Reference { stale: true, .. } => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED | Modifier::DIM),
        Widget::BrokenReference { .. } => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::CROSSED_OUT),
    }
}

fn mark_style(style: Style, mark: MarkKind) -> Style {
    match mark {
        MarkKind::RevealedMarker => style.add_modifier(Modifier::REVERSED),
        MarkKind::DefinitionTerm => style.add_modifier(Modifier::BOLD),
        MarkKind::Superscript => style.fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        MarkKind::Subscript => style.fg(Color::Yellow).add_modifier(Modifier::DIM),
        MarkKind::DuplicateLabel => style.fg(Color::Red).add_modifier(Modifier::UNDERLINED),
        MarkKind::StaleNumber => style.add_modifier(Modifier::DIM),
        MarkKind::ProcessorFailed => style.bg(Color::Red),
    }
}

/// One source line with decorations applied. Also returns the column the
/// cursor lands on when it is on this line.
fn styled_line(
    text: &str,
    line_start: usize,
    decorations: &[Decoration],
    cursor: Option<usize>,
) -> (Line<'static>, Option<u16>) {
    let line_end = line_start + text.len();
    let relevant: Vec<&Decoration> = decorations
        .iter()
        .filter(|d| d.span.start <= line_end && d.span.end >= line_start)
        .collect();

    let mut spans = Vec::new();
    let mut buf = String::new();
    let mut style = Style::default();
    let mut column = 0u16;
    let mut cursor_column = None;
    let mut i = 0;

    let flush = |spans: &mut Vec<Span<'static>>, buf: &mut String, style: Style| {
        if !buf.is_empty() {
            spans.push(Span::styled(std::mem::take(buf), style));
        }
    };

    while i <= text.len() {
        let pos = line_start + i;
        if cursor == Some(pos) {
            cursor_column = Some(column);
        }
        if i == text.len() {
            break;
        }
        let replace = relevant.iter().find_map(|d| match &d.kind {
            DecorationKind::Replace(w) if d.span.start == pos && d.span.end > pos => Some((d.span.end, w)),
            _ => None,
        });
        if let Some((end, widget)) = replace {
            flush(&mut spans, &mut buf, style);
            let shown = widget.text().to_string();
            column = column.saturating_add(shown.chars().count() as u16);
            spans.push(Span::styled(shown, widget_style(widget)));
            i = (end - line_start).min(text.len());
            while !text.is_char_boundary(i) {
                i += 1;
            }
            continue;
        }

        let Some(ch) = text[i..].chars().next() else {
            break;
        };
        let hidden = relevant
            .iter()
            .any(|d| d.kind == DecorationKind::Hide && d.span.start <= pos && pos < d.span.end);
        if !hidden {
            let here = relevant.iter().fold(Style::default(), |s, d| match d.kind {
                DecorationKind::Mark(mark) if d.span.start <= pos && pos < d.span.end => {
                    mark_style(s, mark)
                }
                _ => s,
            });
            if here != style {
                flush(&mut spans, &mut buf, style);
                style = here;
            }
            buf.push(ch);
            column = column.saturating_add(1);
        }
        i += ch.len_utf8();
    }
    flush(&mut spans, &mut buf, style);
    (Line::from(spans), cursor_column)
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let decorations = app.pipeline.decorations();
    let cursor = app.doc.cursor();
    let height = chunks[0].height.saturating_sub(2) as usize;
    let mut cursor_position = None;
    let lines: Vec<Line> = app
        .doc
        .lines()
        .iter()
        .enumerate()
        .skip(app.top)
        .take(height)
        .map(|(n, line)| {
            let (styled, column) =
                styled_line(&line.text, line.content.start, &decorations, Some(cursor));
            if let Some(column) = column {
                cursor_position = Some((column, (n - app.top) as u16));
            }
            styled
        })
        .collect();

    let title = format!("{} (Esc: quit, Ctrl-S: save)", app.path.display());
    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(body, chunks[0]);

    let diagnostics = app.pipeline.diagnostics();
    let status = match diagnostics.iter().find(|d| d.span.touches(cursor)) {
        Some(d) => format!("{:?}: {}", d.severity, d.error),
        None if !app.status.is_empty() => app.status.clone(),
        None => format!("{} diagnostics", diagnostics.len()),
    };
    f.render_widget(Paragraph::new(status), chunks[1]);

    if let Some((x, y)) = cursor_position {
        f.set_cursor_position(Position::new(chunks[0].x + 1 + x, chunks[0].y + 1 + y));
    }
}

pub fn run(path: PathBuf, source: &str, config: ProcessingConfig) -> Result<()> {
    let mut app = App::new(path, source, config)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let height = terminal.size()?.height.saturating_sub(3) as usize;
        app.refresh(height)?;
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && !app.handle_key(key)?
        {
            return Ok(());
        }
    }
}
