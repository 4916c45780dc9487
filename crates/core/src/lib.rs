//! Core business logic for backtalk.
//!
//! - **Authorization policy**: pure allow/deny decisions ([`authorize`])
//! - **Comment lifecycle**: submit, moderate, edit, delete, list
//!   ([`CommentService`])
//! - **User moderation**: trust/ban/suspension transitions
//!   ([`ModerationService`])
//! - **Moderation counts**: pending-queue projection
//!   ([`NotificationService`])
//! - **Sessions**: external identity tokens to profile rows
//!   ([`SessionService`])

pub mod mentions;
pub mod services;

pub use mentions::extract_mentions;
pub use services::*;
