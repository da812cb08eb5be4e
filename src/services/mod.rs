//! Services - business logic
//!
//! This module contains the core business logic services:
//! - `refresher` - refresh orchestration and status-transition detection
//! - `registrar` - add-delivery validation and initial fetch

pub mod refresher;
pub mod registrar;

// Re-export commonly used types
pub use refresher::Refresher;
pub use registrar::{AddError, Registrar};
