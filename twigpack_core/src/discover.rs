use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use crate::TwigpackError;
use crate::TwigpackResult;

const TEMPLATE_MARKER: &str = ".twig";

/// Collect every template file below `root`.
///
/// A file counts as a template when its path contains `.twig`, which also
/// covers compound extensions like `page.twig.html`. A missing root yields
/// no templates rather than an error. The result is sorted for
/// deterministic ordering.
pub fn discover_templates(root: &Path) -> TwigpackResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut ancestors = HashSet::new();

	walk_dir(root, &mut files, &mut ancestors)?;
	files.sort();
	files.dedup();

	Ok(files)
}

fn walk_dir(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	ancestors: &mut HashSet<PathBuf>,
) -> TwigpackResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// A directory whose canonical path is already on the current descent is a
	// symlink cycle. Directories reached twice through sibling links are fine.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !ancestors.insert(canonical.clone()) {
		return Err(TwigpackError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	let result = walk_entries(dir, files, ancestors);
	ancestors.remove(&canonical);

	result
}

fn walk_entries(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	ancestors: &mut HashSet<PathBuf>,
) -> TwigpackResult<()> {
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_dir() {
			walk_dir(&path, files, ancestors)?;
		} else if path.to_string_lossy().contains(TEMPLATE_MARKER) {
			files.push(path);
		}
	}

	Ok(())
}
