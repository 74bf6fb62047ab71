//! Symbol table for the Hack assembler.
//!
//! Two storage tiers: the architectural symbols (`SP`, `R0`..`R15`,
//! `SCREEN`, ...) live in a compile-time `phf` map, while labels and
//! variables discovered during assembly go into a regular `HashMap`.

use phf::phf_map;
use std::collections::HashMap;

/// Symbols built into the Hack platform.
static PREDEFINED_SYMBOLS: phf::Map<&'static str, u16> = phf_map! {
    // Virtual registers
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,

    // VM segment pointers
    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,

    // Memory-mapped I/O
    "SCREEN" => 16384,
    "KBD" => 24576,
};

/// First RAM address handed out to program variables.
pub const VARIABLE_BASE: u16 = 16;

/// Maps symbolic names to 16-bit addresses.
///
/// Labels are bound during pass 1 via [`SymbolTable::add_entry`]; variables
/// are allocated lazily during pass 2 via [`SymbolTable::get_or_insert`],
/// in order of first unbound reference.
///
/// # Example
/// ```
/// use hack_assembler::SymbolTable;
///
/// let mut symbols = SymbolTable::new();
/// assert_eq!(symbols.get("SP"), Some(0));
///
/// symbols.add_entry("LOOP", 10);
/// assert_eq!(symbols.get("LOOP"), Some(10));
/// ```
#[derive(Debug, Default)]
pub struct SymbolTable {
    user_symbols: HashMap<String, u16>,
    next_variable: u16,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_symbols: HashMap::with_capacity(32),
            next_variable: VARIABLE_BASE,
        }
    }

    /// Binds a label to an address.
    #[inline]
    pub fn add_entry(&mut self, symbol: &str, address: u16) {
        self.user_symbols.insert(symbol.to_string(), address);
    }

    /// Whether the symbol is known, predefined or user-defined.
    #[inline]
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        PREDEFINED_SYMBOLS.contains_key(symbol) || self.user_symbols.contains_key(symbol)
    }

    /// Looks up a symbol without allocating.
    #[inline]
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<u16> {
        if let Some(&address) = PREDEFINED_SYMBOLS.get(symbol) {
            return Some(address);
        }
        self.user_symbols.get(symbol).copied()
    }

    /// Resolves a symbol, allocating the next free variable address when it
    /// is unbound. This is the hot path of pass 2.
    #[inline]
    pub fn get_or_insert(&mut self, symbol: &str) -> u16 {
        use std::collections::hash_map::Entry;

        if let Some(&address) = PREDEFINED_SYMBOLS.get(symbol) {
            return address;
        }

        match self.user_symbols.entry(symbol.to_string()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let address = self.next_variable;
                self.next_variable += 1;
                *e.insert(address)
            }
        }
    }

    /// Number of user-defined symbols (labels and variables).
    #[inline]
    #[must_use]
    pub fn user_symbol_count(&self) -> usize {
        self.user_symbols.len()
    }
}
