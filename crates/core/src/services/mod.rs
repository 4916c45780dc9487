//! Business services.

pub mod authz;
pub mod comment;
pub mod moderation;
pub mod notification;
pub mod session;

pub use authz::{authorize, require_moderator, suspension_active, Action};
pub use comment::{
    group_into_threads, initial_status, visibility_for, CommentListing, CommentService,
    CommentThread, ListCommentsQuery, QueueEntry, SubmitCommentInput,
};
pub use moderation::{ModerationService, UpdateUserStatusInput};
pub use notification::{NotificationService, PendingCount};
pub use session::SessionService;
