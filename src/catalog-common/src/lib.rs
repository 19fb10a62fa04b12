mod message;
pub mod fs;
pub mod workdir;

// re-export for convenient use with `message`
pub use colored::Colorize;
