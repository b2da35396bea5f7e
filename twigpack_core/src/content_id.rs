use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use sha2::Digest;
use sha2::Sha512;

/// Maps an absolute dependency path to the identifier the renderer will use
/// to reference it.
///
/// Implementations must be deterministic: the same path always yields the
/// same identifier so that duplicate includes converge on one reference.
pub trait ContentHasher {
	fn content_id(&self, absolute: &Path) -> String;
}

impl<F> ContentHasher for F
where
	F: Fn(&Path) -> String,
{
	fn content_id(&self, absolute: &Path) -> String {
		self(absolute)
	}
}

/// Lowercase hex SHA-512 of the path text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Hasher;

impl ContentHasher for Sha512Hasher {
	fn content_id(&self, absolute: &Path) -> String {
		let mut hasher = Sha512::new();
		hasher.update(absolute.to_string_lossy().as_bytes());
		hex::encode(hasher.finalize())
	}
}

/// Resolve `path` against `base_dir` into an absolute path and normalise
/// `.` and `..` segments lexically. An absolute `path` ignores `base_dir`,
/// and a relative result is anchored at the current working directory.
/// Only the working directory is read from the environment, so the target
/// does not need to exist.
pub fn resolve_path(base_dir: &Path, path: impl AsRef<Path>) -> PathBuf {
	let joined = base_dir.join(path);
	let joined = std::path::absolute(&joined).unwrap_or(joined);
	let mut resolved = PathBuf::new();

	for component in joined.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				// `..` never climbs above the root.
				if !matches!(
					resolved.components().next_back(),
					None | Some(Component::RootDir | Component::Prefix(_))
				) {
					resolved.pop();
				}
			}
			other => resolved.push(other.as_os_str()),
		}
	}

	resolved
}
