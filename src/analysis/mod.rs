pub mod alert;
pub mod config;
pub mod engine;
pub mod eye;
pub mod features;
pub mod mouth;
pub mod regulator;

pub use alert::{Alert, AlertSeverity, DrowsinessLevel};
pub use config::{AnalysisConfig, LandmarkIndices};
pub use engine::{DrowsinessEngine, EngineSnapshot, EventCounters, SampleOutcome};
pub use eye::{EyeClosureMachine, EyeEvent, EyeState};
pub use features::{FaceFeatures, SampleError};
pub use mouth::MouthApertureMachine;
pub use regulator::{BlinkWindow, ProbabilityRegulator, MAX_SCORE};
