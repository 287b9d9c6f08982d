pub mod api;
pub mod clipboard;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod fallback;
pub mod hazard;
pub mod location;
pub mod page;
pub mod render;

pub use coordinator::{DispatchOutcome, DispatchReport, EmergencyCoordinator, InstructionsOutcome};
pub use error::{CoordinatorError, ErrorKind};
pub use hazard::HazardType;
