//! HTTP surfaces for the front-desk features. Each submodule is mounted
//! as its own top-level API module.

pub mod announcements;
pub mod feedback;
pub mod leave;
pub mod menu;
pub mod rules;

/// Signature images are small; the bound mostly guards against abuse.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
