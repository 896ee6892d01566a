//! waitertrain-core: scenario catalog, session state machine, and scoring.
//!
//! Provides the immutable scenario catalog and the [`SessionManager`] that owns
//! live training sessions. Ended sessions become [`report::SessionSummary`]
//! values, which [`statistics`] aggregates per trainee.

pub mod catalog;
pub mod error;
pub mod manager;
pub mod model;
pub mod parser;
pub mod report;
pub mod selection;
pub mod statistics;
pub mod traits;

pub use catalog::ScenarioCatalog;
pub use error::{ProviderError, TrainingError};
pub use manager::{SessionManager, SessionManagerConfig};
pub use traits::FeedbackProvider;
