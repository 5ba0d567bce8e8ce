pub mod app;
pub mod input;
pub mod render;
pub mod theme;
pub mod vocab_prompt;

pub use app::run;
