//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Read-receipt commands
pub mod readme;

/// Scheduling sheet commands
pub mod schedule;

// Export commands
pub use general::*;
pub use readme::*;
pub use schedule::*;
