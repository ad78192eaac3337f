use anyhow::Result;
use serde::Serialize;

mod check;
mod install;
mod list;
mod remove;
mod saves;
mod search;
pub mod services;

pub use check::check;
pub use install::{deps, install};
pub use list::{list, set_enabled};
pub use remove::remove;
pub use saves::save_mods;
pub use search::{games, search};

/// Print a value as pretty JSON on stdout
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
