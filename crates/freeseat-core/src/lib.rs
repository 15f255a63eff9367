//! freeseat acquisition engine
//!
//! The retry engine that acquires a free-tier compute instance: decide
//! whether a satisfying instance already exists, attempt to launch one if
//! not, classify every provider error into retryable vs. fatal, and loop
//! with a fixed back-off until a terminal state is reached.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                freeseat CLI                  │
//! └──────────────────┬──────────────────────────┘
//!                    │
//! ┌──────────────────▼──────────────────────────┐
//! │               freeseat-core                  │
//! │   AcquisitionEngine + pure state machine     │
//! │   traits: ComputeProvider / TargetResolver   │
//! │           Recorder / Sleeper                 │
//! └───────┬──────────────────────┬──────────────┘
//!         │                      │
//! ┌───────▼────────┐    ┌────────▼────────┐
//! │ freeseat-cloud- │    │ freeseat-notify │
//! │      oci        │    │  file + webhook │
//! └────────────────┘    └─────────────────┘
//! ```

pub mod engine;
pub mod error;
pub mod existence;
pub mod model;
pub mod provider;
pub mod recorder;

// Re-exports
pub use engine::{AcquisitionEngine, AcquisitionState, EngineConfig, StateEvent, transition};
pub use error::{CoreError, ErrorKind, OUT_OF_HOST_CAPACITY, ProviderError, Result};
pub use existence::{CHECK_SPACING, DEFAULT_ACCEPTED_STATES, find_satisfying, select_satisfying};
pub use model::{
    AcquisitionTarget, InstanceSnapshot, LifecycleState, RunOutcome, Shape, ShapeSizing,
};
pub use provider::{ComputeProvider, Sleeper, TargetResolver, TokioSleeper};
pub use recorder::{NullRecorder, Recorder};
