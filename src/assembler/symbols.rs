//! The symbol table maps names to ROM or RAM addresses.
//!
//! A fresh table is seeded with the predefined Hack symbols. Labels are
//! bound during the first pass and variables during the second. Once a
//! name is bound it is never rebound.
use std::collections::hash_map::{self, HashMap};

/// Base of the memory-mapped screen, and the first address variables may not use.
pub const SCREEN: u16 = 16384;
/// Memory-mapped keyboard register.
pub const KBD: u16 = 24576;
/// Number of virtual registers R0..R15. Variables are allocated right after them.
pub const REGISTER_COUNT: u16 = 16;

const PREDEFINED: [(&str, u16); 7] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("SCREEN", SCREEN),
    ("KBD", KBD),
];

/// What happened when a label was bound.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Binding {
    Bound,
    /// The name is predefined; the predefined address is kept.
    Reserved(u16),
    /// The name was already bound to the given address.
    Duplicate(u16),
}

#[derive(Clone, Debug)]
pub struct SymbolTable {
    symbols: HashMap<String, u16>,
    reserved: usize,
    next_variable: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut symbols = HashMap::with_capacity(64);
        for (name, address) in PREDEFINED.iter() {
            symbols.insert((*name).to_owned(), *address);
        }
        for i in 0..REGISTER_COUNT {
            symbols.insert(format!("R{}", i), i);
        }

        let reserved = symbols.len();
        SymbolTable { symbols, reserved, next_variable: REGISTER_COUNT }
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Whether `name` is one of the predefined symbols.
    pub fn is_reserved(name: &str) -> bool {
        if PREDEFINED.iter().any(|(n, _)| *n == name) {
            return true;
        }
        match name.strip_prefix('R') {
            Some(digits) => match digits.parse::<u16>() {
                // Reject spellings like R01 that would parse to a register index.
                Ok(i) => i < REGISTER_COUNT && i.to_string() == digits,
                Err(_) => false,
            },
            None => false,
        }
    }

    /// Binds a label to a ROM address.
    pub fn bind_label(&mut self, name: &str, address: u16) -> Binding {
        if let Some(existing) = self.get(name) {
            if SymbolTable::is_reserved(name) {
                return Binding::Reserved(existing);
            }
            return Binding::Duplicate(existing);
        }

        self.symbols.insert(name.to_owned(), address);
        Binding::Bound
    }

    /// Gives `name` the next free variable address, or returns the address it
    /// already has. Returns None once the addresses below SCREEN are used up.
    pub fn allocate_variable(&mut self, name: &str) -> Option<u16> {
        if let Some(address) = self.get(name) {
            return Some(address);
        }
        if self.next_variable >= SCREEN {
            return None;
        }

        let address = self.next_variable;
        self.next_variable += 1;
        self.symbols.insert(name.to_owned(), address);
        Some(address)
    }

    /// Number of variables allocated so far.
    pub fn variable_count(&self) -> u16 {
        self.next_variable - REGISTER_COUNT
    }

    /// Number of bound names, predefined ones included.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Number of names bound by the program itself.
    pub fn user_defined(&self) -> usize {
        self.symbols.len() - self.reserved
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, u16> {
        self.symbols.iter()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined() {
        let table = SymbolTable::new();
        assert_eq!(table.get("SP"), Some(0));
        assert_eq!(table.get("LCL"), Some(1));
        assert_eq!(table.get("ARG"), Some(2));
        assert_eq!(table.get("THIS"), Some(3));
        assert_eq!(table.get("THAT"), Some(4));
        assert_eq!(table.get("SCREEN"), Some(16384));
        assert_eq!(table.get("KBD"), Some(24576));
        for i in 0..16 {
            assert_eq!(table.get(&format!("R{}", i)), Some(i));
        }
        assert_eq!(table.get("R16"), None);
        assert_eq!(table.len(), 23);
        assert_eq!(table.user_defined(), 0);
    }

    #[test]
    fn test_is_reserved() {
        assert!(SymbolTable::is_reserved("SP"));
        assert!(SymbolTable::is_reserved("KBD"));
        assert!(SymbolTable::is_reserved("R0"));
        assert!(SymbolTable::is_reserved("R15"));

        assert!(!SymbolTable::is_reserved("R16"));
        assert!(!SymbolTable::is_reserved("R01"));
        assert!(!SymbolTable::is_reserved("R"));
        assert!(!SymbolTable::is_reserved("sp"));
        assert!(!SymbolTable::is_reserved("LOOP"));
    }

    #[test]
    fn test_reserved_names_never_rebound() {
        let mut table = SymbolTable::new();
        assert_eq!(table.bind_label("SCREEN", 3), Binding::Reserved(16384));
        assert_eq!(table.bind_label("R3", 99), Binding::Reserved(3));
        assert_eq!(table.allocate_variable("THIS"), Some(3));

        assert_eq!(table.get("SCREEN"), Some(16384));
        assert_eq!(table.get("R3"), Some(3));
        assert_eq!(table.variable_count(), 0);
    }

    #[test]
    fn test_labels_never_rebound() {
        let mut table = SymbolTable::new();
        assert_eq!(table.bind_label("LOOP", 4), Binding::Bound);
        assert_eq!(table.bind_label("LOOP", 10), Binding::Duplicate(4));
        assert_eq!(table.get("LOOP"), Some(4));
        assert_eq!(table.user_defined(), 1);
    }

    #[test]
    fn test_variable_allocation() {
        let mut table = SymbolTable::new();
        table.bind_label("END", 16);

        assert_eq!(table.allocate_variable("i"), Some(16));
        assert_eq!(table.allocate_variable("sum"), Some(17));
        assert_eq!(table.allocate_variable("i"), Some(16));
        assert_eq!(table.allocate_variable("END"), Some(16));
        assert_eq!(table.allocate_variable("n"), Some(18));
        assert_eq!(table.variable_count(), 3);
    }

    #[test]
    fn test_variable_space_exhausted() {
        let mut table = SymbolTable::new();
        for i in 16..SCREEN {
            assert_eq!(table.allocate_variable(&format!("v{}", i)), Some(i));
        }
        assert_eq!(table.allocate_variable("overflow"), None);
        assert_eq!(table.get("overflow"), None);

        // Names bound earlier still resolve.
        assert_eq!(table.allocate_variable("v16"), Some(16));
    }
}
