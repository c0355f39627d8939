pub mod attachments;
pub mod auth;
pub mod gallery;
pub mod notifier;
pub mod preview;
