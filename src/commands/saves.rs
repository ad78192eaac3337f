use anyhow::Result;

use crate::{
    application::SaveInspector, archive::ZipArchiveReader, config::Config,
    domain::model::SaveSummary, runtime::Runtime,
};

use super::print_json;

/// Show the mods recorded in one save, or in every save
#[tracing::instrument(skip(runtime, config))]
pub fn save_mods<R: Runtime>(
    runtime: R,
    config: Config,
    save: Option<&str>,
    json: bool,
) -> Result<()> {
    let inspector = SaveInspector::new(&runtime, &ZipArchiveReader, config.save_dir);
    let summaries = match save {
        Some(name) => vec![inspector.mods_from_save(name)?],
        None => inspector.mods_from_saves()?,
    };

    if json {
        return print_json(&summaries);
    }
    if summaries.is_empty() {
        println!("No saves found.");
    }
    for summary in &summaries {
        print_summary(summary);
    }
    Ok(())
}

fn print_summary(summary: &SaveSummary) {
    println!("{}:", summary.name);
    for entry in &summary.mods {
        println!("  {} {}", entry.name, entry.version);
    }
}
