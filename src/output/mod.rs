//! Output formatting module

pub mod render;

pub use render::{render, render_expiry, OutputStyle, RenderOptions, TimeFormat};
