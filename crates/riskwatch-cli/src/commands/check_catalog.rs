//! The `riskwatch check-catalog` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;

use crate::loader;

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let catalog = loader::load_catalog(&catalog_path)?;
    println!("Catalog: {} ({} courses)", catalog_path.display(), catalog.len());

    let graph = catalog.build_graph()?;
    println!(
        "Prerequisite graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let unlisted: BTreeSet<&str> = catalog
        .courses()
        .iter()
        .flat_map(|c| c.prereq.iter())
        .filter(|p| catalog.get(p).is_err())
        .map(String::as_str)
        .collect();
    for code in &unlisted {
        println!("  WARNING: prerequisite {code} is not in the catalog");
    }

    println!("No prerequisite cycles.");
    Ok(())
}
