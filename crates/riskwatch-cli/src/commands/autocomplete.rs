//! The `riskwatch autocomplete` command.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::load_config_from;
use crate::loader;

pub fn execute(catalog_path: PathBuf, query: String, config_path: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(!query.trim().is_empty(), "query must not be empty");

    let config = load_config_from(config_path.as_deref())?;
    let catalog = loader::load_catalog(&catalog_path)?;
    let index = catalog.build_index();

    let matches = index.search_limited(query.trim(), config.autocomplete_limit);
    if matches.is_empty() {
        println!("No courses match '{}'.", query.trim());
    }
    for course in &matches {
        println!("{}  {}", course.code, course.title);
    }

    Ok(())
}
