use crossterm::style::Stylize;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Dim,
    Good,
    Warn,
    Bad,
    Accent,
}

/// Applies terminal styling when color is enabled. Pad before painting: the
/// escape codes count towards format widths.
pub fn paint(text: &str, tone: Tone, opts: &RenderOptions) -> String {
    if !opts.color {
        return text.to_string();
    }
    match tone {
        Tone::Plain => text.to_string(),
        Tone::Dim => text.dark_grey().to_string(),
        Tone::Good => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Bad => text.red().bold().to_string(),
        Tone::Accent => text.cyan().bold().to_string(),
    }
}
