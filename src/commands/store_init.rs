use anyhow::Result;

use crate::commands::CommandReport;
use crate::paths::resolve_paths;
use crate::query::store::{init_schema, schema_version};

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("store-init");

    init_schema(&paths.db_path)?;
    report.detail(format!("store={}", paths.db_path.display()));
    report.detail(format!("schema_version={}", schema_version(&paths.db_path)?));
    Ok(report)
}
