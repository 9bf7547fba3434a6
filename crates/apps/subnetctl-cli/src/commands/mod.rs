//! CLI command implementations.

pub mod completions;
pub mod deploy;
pub mod elastic;
pub mod join;
pub mod key;
pub mod subnet;
pub mod transaction;
pub mod validators;

// Re-export command handlers
pub use completions::completions;
pub use deploy::{deploy, register, DeployArgs};
pub use elastic::{delegate, transform, TransformArgs};
pub use join::{join, JoinArgs};
pub use key::{key_delete, key_import, key_list};
pub use subnet::{configure, create, delete, describe, import, list};
pub use transaction::{commit, sign};
pub use validators::{add_validator, remove_validator, stats, validators};
