mod controller;
mod loop_worker;
pub mod replay;

pub use controller::{EngineHandle, SensingController};
pub use loop_worker::LoopStats;
pub use replay::{read_samples, SampleReader};
