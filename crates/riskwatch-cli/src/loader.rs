//! Read-only JSON loading for catalogs and student records.

use std::path::Path;

use anyhow::{Context, Result};

use riskwatch_core::model::{Catalog, Student};

/// Load a course catalog (a JSON array of courses).
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog: {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalog: {}", path.display()))?;
    tracing::debug!("loaded {} course(s) from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Load one student record.
pub fn load_student(path: &Path) -> Result<Student> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read student: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse student: {}", path.display()))
}

/// Load every `student_*.json` in `dir`, ordered by file name.
///
/// Unreadable records are skipped with a warning.
pub fn load_students(dir: &Path) -> Result<Vec<Student>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        let is_record = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("student_") && n.ends_with(".json"));
        if is_record {
            paths.push(path);
        }
    }
    paths.sort();

    let mut students = Vec::with_capacity(paths.len());
    for path in paths {
        match load_student(&path) {
            Ok(student) => students.push(student),
            Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
        }
    }
    Ok(students)
}
