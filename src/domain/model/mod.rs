pub mod dependency;
pub mod installed;
pub mod release;
pub mod save;
pub mod version;

pub use dependency::*;
pub use installed::*;
pub use release::*;
pub use save::*;
pub use version::*;
