//! Users-file reader. The format is one header line, then
//! `username<TAB>credential` records with exactly one tab each. Blank lines
//! and lines without a usable alphanumeric username are skipped.

use std::collections::HashMap;
use std::path::Path;

use super::AuthError;

pub fn read_users_file(path: &Path) -> Result<HashMap<String, String>, AuthError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AuthError::Io(path.to_path_buf(), e))?;

    let mut users = HashMap::new();
    for (index, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        if line.bytes().filter(|&b| b == b'\t').count() > 1 {
            return Err(AuthError::BadFormat(index + 1));
        }
        let Some((username, credential)) = line.split_once('\t') else {
            continue;
        };
        if username.is_empty() || !username.bytes().all(|b| b.is_ascii_alphanumeric()) {
            continue;
        }
        users.insert(username.to_string(), credential.to_string());
    }
    Ok(users)
}
