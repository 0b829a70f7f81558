use crate::machine::TuringMachine;
use crate::types::TypingMachineError;
use serde::Serialize;
use tracing::error;

// Embedded example machines
const MACHINE_TEXTS: [&str; 3] = [
    include_str!("../machines/anbn.tm"),
    include_str!("../machines/palindromes.tm"),
    include_str!("../machines/even-length.tm"),
];

lazy_static::lazy_static! {
    pub static ref MACHINES: Vec<TuringMachine> = MACHINE_TEXTS
        .iter()
        .filter_map(|text| match crate::parser::parse(text) {
            Ok(machine) => Some(machine),
            Err(e) => {
                error!(error = %e, "failed to parse embedded machine");
                None
            }
        })
        .collect();
}

/// Lookup of the example machines shipped with the crate, keyed by name.
pub struct MachineRegistry;

impl MachineRegistry {
    /// Get the number of available machines
    pub fn get_machine_count() -> usize {
        MACHINES.len()
    }

    /// Get a machine by its index
    pub fn get_machine_by_index(index: usize) -> Result<TuringMachine, TypingMachineError> {
        MACHINES.get(index).cloned().ok_or_else(|| {
            TypingMachineError::ValidationError(format!("Machine index {} out of range", index))
        })
    }

    /// Get a machine by its name, e.g. `anbn`.
    pub fn get_machine_by_name(name: &str) -> Result<TuringMachine, TypingMachineError> {
        MACHINES
            .iter()
            .find(|machine| machine.name() == name)
            .cloned()
            .ok_or_else(|| {
                TypingMachineError::ValidationError(format!(
                    "Machine '{}' not found, available: {}",
                    name,
                    Self::list_machine_names().join(", ")
                ))
            })
    }

    /// List all machine names
    pub fn list_machine_names() -> Vec<String> {
        MACHINES.iter().map(|machine| machine.name().to_string()).collect()
    }

    /// Get information about a machine by its index
    pub fn get_machine_info(index: usize) -> Result<MachineInfo, TypingMachineError> {
        let machine = Self::get_machine_by_index(index)?;

        Ok(MachineInfo {
            index,
            name: machine.name().to_string(),
            initial_state: machine.initial_state().to_string(),
            halting_state: machine.halting_state().to_string(),
            alphabet: machine.alphabet().to_vec(),
            state_count: machine.states().len(),
            transition_count: machine.transitions().len(),
        })
    }

    /// Search for machines by name
    pub fn search_machines(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        MACHINES
            .iter()
            .enumerate()
            .filter(|(_, machine)| machine.name().to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub halting_state: String,
    pub alphabet: Vec<String>,
    pub state_count: usize,
    pub transition_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    #[test]
    fn test_all_embedded_machines_parse() {
        assert_eq!(MachineRegistry::get_machine_count(), MACHINE_TEXTS.len());
    }

    #[test]
    fn test_all_machines_are_valid() {
        for i in 0..MachineRegistry::get_machine_count() {
            let machine = MachineRegistry::get_machine_by_index(i).unwrap();
            assert!(
                analyze(&machine).is_ok(),
                "Machine '{}' is invalid",
                machine.name()
            );
        }
    }

    #[test]
    fn test_machine_names() {
        let names = MachineRegistry::list_machine_names();
        assert_eq!(names, vec!["anbn", "palindromes", "even-length"]);
    }

    #[test]
    fn test_get_machine_by_name() {
        let machine = MachineRegistry::get_machine_by_name("anbn").unwrap();
        assert_eq!(machine.initial_state(), "q0");
        assert_eq!(machine.halting_state(), "q4");
        assert_eq!(machine.alphabet(), ["a", "c", "b"]);
        assert_eq!(machine.transitions().len(), 12);
        // follows the state blocks of the file
        assert_eq!(machine.states(), ["q0", "q1", "q4", "q2", "q3"]);

        let result = MachineRegistry::get_machine_by_name("Nonexistent");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("palindromes"));
    }

    #[test]
    fn test_get_machine_by_index() {
        assert!(MachineRegistry::get_machine_by_index(0).is_ok());
        assert!(MachineRegistry::get_machine_by_index(999).is_err());
    }

    #[test]
    fn test_get_machine_info() {
        let info = MachineRegistry::get_machine_info(1).unwrap();
        assert_eq!(info.index, 1);
        assert_eq!(info.name, "palindromes");
        assert_eq!(info.halting_state, "q8");
        assert_eq!(info.state_count, 9);
        assert_eq!(info.transition_count, 26);

        assert!(MachineRegistry::get_machine_info(999).is_err());
    }

    #[test]
    fn test_search_machines() {
        assert_eq!(MachineRegistry::search_machines("PALIN"), vec![1]);
        assert_eq!(MachineRegistry::search_machines("n"), vec![0, 1, 2]);
        assert!(MachineRegistry::search_machines("nonexistent").is_empty());
    }
}
