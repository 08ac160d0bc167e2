//! The `riskwatch prereqs` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::loader;

pub fn execute(catalog_path: PathBuf, course: String, completed: Option<String>) -> Result<()> {
    let catalog = loader::load_catalog(&catalog_path)?;
    let entry = catalog.get(&course)?;
    let graph = catalog
        .build_graph()
        .with_context(|| format!("invalid catalog: {}", catalog_path.display()))?;

    let completed: BTreeSet<String> = completed
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    println!("{}: {} ({} credits)", entry.code, entry.title, entry.credit);
    println!("  direct:     {}", join(&graph.direct_prerequisites_of(&course)));
    println!("  transitive: {}", join(&graph.prerequisites_of(&course)));
    if !completed.is_empty() {
        let missing = graph.missing_prerequisites(&course, &completed);
        println!("  missing:    {}", join(&missing));
        println!("  can take:   {}", if missing.is_empty() { "yes" } else { "no" });
    }

    Ok(())
}

fn join(codes: &BTreeSet<String>) -> String {
    if codes.is_empty() {
        "-".to_string()
    } else {
        codes.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}
