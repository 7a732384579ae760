//! Text report rendering.

pub mod style;
pub mod text;

pub use style::{paint, RenderOptions, Tone};
pub use text::{
    collecting_line, hop_table, path_line, render_report, target_line, DESTINATION_MARKER,
};
