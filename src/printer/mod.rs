//! Printers: colored status lines and markdown (termimad).

use owo_colors::OwoColorize;
use termimad::MadSkin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
}

pub fn status(tone: Tone, text: &str) {
    match tone {
        Tone::Info => println!("{}", text.cyan()),
        Tone::Success => println!("{}", text.green()),
        Tone::Warning => println!("{}", text.yellow()),
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) { self.skin.print_text(text); println!(); }
}
