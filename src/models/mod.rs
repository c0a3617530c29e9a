pub mod event;
pub mod landmarks;
pub mod session;

pub use event::{Event, EventKind, EventRecord, HistoryEntry};
pub use landmarks::{Point, Sample};
pub use session::{Session, SessionEvent, SessionSummary};
