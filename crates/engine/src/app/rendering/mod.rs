mod canvas;
mod renderer;
mod sprites;
mod transform;

pub use renderer::Renderer;
pub use transform::{level_origin_px, world_to_screen_px, Viewport};
