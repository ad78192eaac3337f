//! Application layer - Use cases that coordinate domain services.
//!
//! This layer orchestrates the flow of data between the CLI layer, the
//! portal and downloader collaborators, and the domain services.

mod install;
mod remove;
mod saves;
mod update;

pub use install::{InstallAction, InstallResult};
pub use remove::{RemoveAction, RemovePattern};
pub use saves::SaveInspector;
pub use update::{UpdateAction, UpdateReport};
