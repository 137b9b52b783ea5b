use anyhow::{Context, Result, bail};
use listmark_config::Config;
use listmark_engine::{
    Decoration, DecorationKind, Diagnostic, Document, LivePipeline, ProcessingConfig,
    parsing::rope::preview, render_markdown,
};
use std::{env, path::PathBuf, process};

mod view;

const USAGE: &str = "Usage: listmark <render|decorate|view> <file.md>";

enum Command {
    Render,
    Decorate,
    View,
}

fn parse_args(args: &[String]) -> Result<(Command, PathBuf)> {
    match args {
        [_, command, path] => {
            let command = match command.as_str() {
                "render" => Command::Render,
                "decorate" => Command::Decorate,
                "view" => Command::View,
                other => bail!("unknown command `{other}`"),
            };
            Ok((command, PathBuf::from(path)))
        }
        [_, path] => Ok((Command::View, PathBuf::from(path))),
        _ => bail!("expected a command and a file"),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let (command, path) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(Some(config)) => {
            log::info!("Loaded settings from {}", config_path.display());
            config
        }
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let processing = config.processing_config()?;
    let path = config.resolve_document(&path);
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;

    match command {
        Command::Render => print!("{}", render_markdown(&source, &processing)),
        Command::Decorate => print!("{}", decorate(&source, processing)?),
        Command::View => view::run(path, &source, processing)?,
    }
    Ok(())
}

/// Runs one live pass over `source` and lists what it produced.
fn decorate(source: &str, config: ProcessingConfig) -> Result<String> {
    let doc = Document::from_bytes(source.as_bytes())?;
    let mut pipeline = LivePipeline::new(config);
    pipeline.process(&doc)?;

    let mut out = String::new();
    for decoration in pipeline.decorations() {
        out.push_str(&describe(&decoration, source));
        out.push('\n');
    }
    for diagnostic in pipeline.diagnostics() {
        out.push_str(&describe_diagnostic(&diagnostic));
        out.push('\n');
    }
    Ok(out)
}

const PREVIEW_LEN: usize = 40;

fn describe(decoration: &Decoration, source: &str) -> String {
    let span = decoration.span;
    let text = preview(span.slice(source), PREVIEW_LEN);
    let what = match &decoration.kind {
        DecorationKind::Replace(widget) => format!("replace {text:?} with {:?}", widget.text()),
        DecorationKind::Mark(mark) => format!("mark {mark:?} {text:?}"),
        DecorationKind::Hide => format!("hide {text:?}"),
        DecorationKind::Line(class) => format!("line {class:?}"),
    };
    format!("{}..{} {what}", span.start, span.end)
}

fn describe_diagnostic(diagnostic: &Diagnostic) -> String {
    format!(
        "{:?} {}..{}: {}",
        diagnostic.severity, diagnostic.span.start, diagnostic.span.end, diagnostic.error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_path_opens_the_viewer() {
        let (command, path) = parse_args(&args(&["listmark", "notes.md"])).unwrap();
        assert!(matches!(command, Command::View));
        assert_eq!(path, PathBuf::from("notes.md"));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(parse_args(&args(&["listmark", "explode", "notes.md"])).is_err());
        assert!(parse_args(&args(&["listmark"])).is_err());
    }

    #[test]
    fn decorate_lists_widgets_and_diagnostics() {
        let out = decorate("1. a\n\nSee \\ref{x}.\n", ProcessingConfig::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "0..2 replace \"1.\" with \"1.\"",
                "0..4 line ListItem { depth: 0 }",
                "10..17 replace \"\\\\ref{x}\" with \"\\\\ref{x}\"",
                "Warning 10..17: reference `\\ref{x}` does not match any label",
            ]
        );
    }
}
