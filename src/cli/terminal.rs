//! Colouring for terminal output

use owo_colors::{OwoColorize, colors::css};
use reqmodel::Key;

/// Whether stdout accepts coloured output
fn stdout_supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Extension trait for colourising status text
pub trait Colorize {
    /// Colour as success (green)
    fn success(&self) -> String;
    /// Colour as failure (red)
    fn failure(&self) -> String;
    /// Colour as warning (amber)
    fn warning(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        paint(self, |s| s.fg::<css::Green>().to_string())
    }

    fn failure(&self) -> String {
        paint(self, |s| s.fg::<css::Red>().to_string())
    }

    fn warning(&self) -> String {
        paint(self, |s| s.fg::<css::Orange>().to_string())
    }

    fn dim(&self) -> String {
        paint(self, |s| s.dimmed().to_string())
    }
}

fn paint(text: &str, style: impl Fn(&str) -> String) -> String {
    if stdout_supports_color() {
        style(text)
    } else {
        text.to_string()
    }
}

/// Renders a key with its kind labels dimmed, so the names stand out.
pub fn highlight(key: &Key) -> String {
    key.segments()
        .map(|segment| {
            let mut rendered = segment.kind().label().dim();
            if let Some(qualifier) = segment.qualifier() {
                rendered.push('/');
                rendered.push_str(&qualifier.label().warning());
            }
            rendered.push('/');
            rendered.push_str(segment.name());
            rendered
        })
        .collect::<Vec<_>>()
        .join("/")
}
