pub mod ease;
pub mod engine;
pub mod timeline;

pub use engine::{AnimationFrame, AnimationInstance, AnimationTimingEngine, HideOutcome, PhaseChange};
pub use timeline::{AnimationPhase, TimelinePlan, TimingConfig};
