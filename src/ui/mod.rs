pub mod output;
pub mod renderer;
pub mod reveal;

pub use renderer::{render_listener, run_renderer, RenderEvent};
pub use reveal::WordReveal;
