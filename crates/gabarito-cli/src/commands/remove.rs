//! The `gabarito remove` command.

use std::path::PathBuf;

use anyhow::Result;

use gabarito_providers::load_config_from;

pub fn execute(
    id: String,
    store_override: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = super::open_store(&config, store_override);

    match store.get(&id) {
        Some(exam) => {
            store.remove(&id)?;
            println!("Removed '{}' [id: {id}]", exam.title);
        }
        None => println!("No saved exam with id '{id}', nothing to remove."),
    }
    Ok(())
}
