//! Internal domain models, distinct from API response models
//! (which live in `courtside_api` and carry camelCase renames).

pub mod catalog;
pub mod code;
pub mod grant;
pub mod moderation;
