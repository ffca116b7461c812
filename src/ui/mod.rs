pub mod input;
pub mod render;
pub mod styles;

pub use input::handle_input;
pub use render::render;
