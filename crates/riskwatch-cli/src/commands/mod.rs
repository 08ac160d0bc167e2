pub mod autocomplete;
pub mod check_catalog;
pub mod init;
pub mod prereqs;
pub mod score;
pub mod sweep;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use riskwatch_core::graph::DependencyGraph;

use crate::loader;

/// Reference date for scoring: the explicit `--today`, else the local date.
pub(crate) fn reference_date(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Load a catalog and build its prerequisite graph, failing on cycles.
pub(crate) fn load_graph(catalog_path: &Path) -> Result<DependencyGraph> {
    let catalog = loader::load_catalog(catalog_path)?;
    catalog
        .build_graph()
        .with_context(|| format!("invalid catalog: {}", catalog_path.display()))
}
