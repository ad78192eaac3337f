pub mod dependency_parser;
pub use dependency_parser::*;

pub mod inventory;
pub use inventory::*;

pub mod resolver;
pub use resolver::*;

pub mod save_decoder;
pub use save_decoder::*;
