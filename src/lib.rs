//! Student trajectory visualizer.
//!
//! Loads a student's LMS interaction export, turns the ordered interaction
//! log into a chain-shaped graph, classifies every node (category shape,
//! active/passive color, grade label) and hands the result to an external
//! renderer as Graphviz DOT, a JSON render model, CSV or a markdown report.
//!
//! ```text
//! file ──▶ loader ──▶ session (roster) ──▶ trajectory + grade index
//!                                               │
//!                                               ▼
//!                                 classify ──▶ render / report
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod grades;
pub mod layout;
pub mod loader;
pub mod models;
pub mod render;
pub mod report;
pub mod session;
pub mod trajectory;

pub use config::Config;
pub use error::{ConfigError, LoadError};
pub use grades::GradeLabelIndex;
pub use models::{InteractionRecord, StudentRecord, TrajectoryNode};
pub use session::{LoadOutcome, LoadedStudent, Session};
