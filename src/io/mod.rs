pub mod project_io;
pub mod script;
pub mod watcher;
