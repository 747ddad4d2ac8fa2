//! Persistence for the console address remembered between sessions.
//! A plain-text file with one address; used as a reconnect hint.

use std::fs;
use std::io;
use std::path::Path;

use colored::Colorize;

use crate::print_warning;

/// Reads the address remembered from a previous session.
pub(crate) fn load(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let address = contents.trim();
            if address.is_empty() {
                None
            } else {
                Some(address.to_string())
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            print_warning!("could not read {}: {e}", path.display());
            None
        }
    }
}

/// Remembers `address` for the next session.
pub(crate) fn store(path: &Path, address: &str) {
    if let Err(e) = fs::write(path, format!("{address}\n")) {
        print_warning!("could not write {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_an_address() {
        let dir = std::env::temp_dir().join("padlinkd-hints-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("console.addr");

        store(&path, "7C:BB:8A:12:34:56");
        assert_eq!(load(&path), Some("7C:BB:8A:12:34:56".to_string()));

        fs::remove_file(&path).unwrap();
        assert_eq!(load(&path), None);
    }
}
