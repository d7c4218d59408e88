pub mod observer;
pub mod orchestrator;
pub mod session;

pub use observer::ObserverEvent;
pub use orchestrator::Orchestrator;
pub use session::{Session, TaskOutcome};
