pub mod coordinator;
pub mod review;
pub mod state;
pub mod summary;

pub use coordinator::{SessionCoordinator, StartOutcome};
pub use review::{review_session, MinuteBucket, NotableKind, NotableMoment, SessionReview};
pub use state::{SessionPhase, SessionState};
pub use summary::{summarize, SessionReport};
