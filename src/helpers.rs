use std::path::Path;

/// Single-quotes a path for interpolation into an `sh -c` command line.
pub fn shell_quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    format!("'{}'", text.replace('\'', r"'\''"))
}
