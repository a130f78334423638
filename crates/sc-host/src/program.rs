//! Locating the sidecar executable.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Resolve the configured program to a path to spawn.
///
/// Absolute and multi-component paths are used as given. A bare name is
/// looked up next to the current executable, where bundlers place
/// sidecars, and otherwise left for the OS to find on `PATH`.
pub fn resolve_program(program: &str) -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_program_in(program, exe_dir.as_deref())
}

pub fn resolve_program_in(program: &str, exe_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(program);
    if path.is_absolute() || path.components().count() > 1 {
        return path.to_path_buf();
    }

    if let Some(dir) = exe_dir {
        for candidate in sibling_names(program) {
            let sibling = dir.join(candidate);
            if sibling.is_file() {
                debug!("Using sidecar (sibling): {}", sibling.display());
                return sibling;
            }
        }
    }

    debug!("Using sidecar from PATH: {program}");
    path.to_path_buf()
}

fn sibling_names(program: &str) -> Vec<String> {
    let mut names = vec![program.to_string()];
    if cfg!(windows) && !program.ends_with(".exe") {
        names.push(format!("{program}.exe"));
    }
    names
}
