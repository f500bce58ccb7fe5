//! Import fixing for rewritten files.

use litmask_core::ast::{File, ImportSpec};
use tracing::debug;

/// Adds `import "path"` to `file` unless the package is already reachable under its own
/// name. Imports stay sorted by path. Returns true if the file changed.
pub fn add_import(file: &mut File, path: &str) -> bool {
    let default_name = path.rsplit('/').next().unwrap_or(path);
    let reachable = file.imports.iter().any(|spec| {
        spec.path == path && spec.name.as_deref().is_none_or(|name| name == default_name)
    });
    if reachable {
        return false;
    }

    let at = file.imports.partition_point(|spec| spec.path.as_str() <= path);
    file.imports.insert(
        at,
        ImportSpec {
            name: None,
            path: path.to_string(),
        },
    );
    debug!("{}: added import {path:?}", file.name);
    true
}
