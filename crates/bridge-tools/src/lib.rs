mod executor;
mod fs;
mod list;
mod shell;

pub use executor::ToolExecutor;
