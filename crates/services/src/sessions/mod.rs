mod engine;
mod plan;
mod state;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use engine::SessionEngine;
pub use plan::{
    SessionBuilder, SessionPlan, SessionPool, SessionQuestion, SessionScope, SessionSettings,
};
pub use state::{SessionEvent, SessionPhase, SessionState, reduce};
pub use view::SessionView;
