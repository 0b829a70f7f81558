//! This module provides the `MachineLoader` struct, responsible for loading machine
//! definitions from files and strings.

use crate::machine::TuringMachine;
use crate::parser::parse;
use crate::types::TypingMachineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of machine definition files.
pub const MACHINE_EXTENSION: &str = "tm";

/// `MachineLoader` is a utility struct for loading machine definitions.
/// It provides methods to load machines from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct MachineLoader;

impl MachineLoader {
    /// Loads a single machine from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` if the file is successfully read and parsed.
    /// * `Err(TypingMachineError::FileError)` if the file cannot be read.
    /// * Any parse or analysis error raised by [`parse`].
    pub fn load_machine(path: &Path) -> Result<TuringMachine, TypingMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TypingMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), bytes = content.len(), "loading machine");
        parse(&content)
    }

    /// Loads a single machine from the provided string content, e.g. piped stdin.
    pub fn load_machine_from_string(content: &str) -> Result<TuringMachine, TypingMachineError> {
        parse(content)
    }

    /// Loads all machine files (`.tm` extension) from a given directory.
    ///
    /// Directories and other files are skipped. Each element of the result is either the
    /// path and machine of a loaded file or the error that file produced, so one broken
    /// definition does not hide the rest.
    pub fn load_machines(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, TuringMachine), TypingMachineError>> {
        if !directory.exists() {
            return vec![Err(TypingMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TypingMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(TypingMachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        // Directory order is platform dependent
        paths.sort();

        results.extend(
            paths
                .into_iter()
                .filter(|path| {
                    !path.is_dir()
                        && path
                            .extension()
                            .is_some_and(|ext| ext == MACHINE_EXTENSION)
                })
                .map(|path| match Self::load_machine(&path) {
                    Ok(machine) => Ok((path, machine)),
                    Err(e) => Err(TypingMachineError::FileError(format!(
                        "Failed to load machine from {}: {}",
                        path.display(),
                        e
                    ))),
                }),
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID_MACHINE: &str =
        "name: Test Machine\nstart: q0\nhalt: stop\nrules:\n  q0:\n    a -> b, R, stop\n  stop:";

    #[test]
    fn test_load_valid_machine() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(VALID_MACHINE.as_bytes()).unwrap();

        let result = MachineLoader::load_machine(&file_path);
        assert!(result.is_ok());

        let machine = result.unwrap();
        assert_eq!(machine.name(), "Test Machine");
        assert_eq!(machine.initial_state(), "q0");
        assert_eq!(machine.states(), ["q0", "stop"]);
    }

    #[test]
    fn test_load_invalid_machine() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"This is not a valid machine").unwrap();

        let result = MachineLoader::load_machine(&file_path);
        assert!(matches!(result, Err(TypingMachineError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = MachineLoader::load_machine(&dir.path().join("absent.tm"));
        assert!(matches!(result, Err(TypingMachineError::FileError(_))));
    }

    #[test]
    fn test_load_machines_from_directory() {
        let dir = tempdir().unwrap();

        // Create a valid machine file
        let mut valid_file = File::create(dir.path().join("valid.tm")).unwrap();
        valid_file.write_all(VALID_MACHINE.as_bytes()).unwrap();

        // Create an invalid machine file
        let mut invalid_file = File::create(dir.path().join("invalid.tm")).unwrap();
        invalid_file
            .write_all(b"This is not a valid machine")
            .unwrap();

        // Create a non-.tm file that should be ignored
        let mut ignored_file = File::create(dir.path().join("ignored.txt")).unwrap();
        ignored_file
            .write_all(b"This file should be ignored")
            .unwrap();

        // And a directory whose name looks like a machine
        std::fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = MachineLoader::load_machines(dir.path());

        // We should have 2 results: 1 error and 1 success, in path order
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        let (path, machine) = results[1].as_ref().unwrap();
        assert!(path.ends_with("valid.tm"));
        assert_eq!(machine.name(), "Test Machine");
    }

    #[test]
    fn test_load_machines_missing_directory() {
        let dir = tempdir().unwrap();
        let results = MachineLoader::load_machines(&dir.path().join("nowhere"));
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(TypingMachineError::FileError(_))));
    }
}
