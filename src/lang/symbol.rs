use super::token::{ALIAS_FIRST, ALIAS_SECOND, RESERVED_PAIRS, RESERVED_VARS};
use super::Error;
use crate::error;
use std::collections::HashMap;

/// Symbol tables and literal pools for one transpilation run.
#[derive(Default)]
pub struct Symbols {
    pub labels: Labels,
    pub vars: Variables,
    pub defines: Defines,
    pub strings: Pool,
    pub comments: Pool,
    pub numbers: Pool,
}

impl Symbols {
    pub fn new() -> Symbols {
        Symbols::default()
    }
}

/// Ordered label names with their resolved BASIC line numbers.
#[derive(Default)]
pub struct Labels {
    names: Vec<String>,
    resolved: HashMap<String, u16>,
}

impl Labels {
    /// Index of a label, registering it on first sight.
    pub fn index_of(&mut self, name: &str) -> usize {
        match self.names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        }
    }

    pub fn resolve(&mut self, name: &str, line_number: u16) {
        self.resolved.insert(name.to_string(), line_number);
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| n.as_str())
    }

    pub fn line_for(&self, name: &str) -> Option<u16> {
        self.resolved.get(name).cloned()
    }
}

/// Variable table. Every `(name, sigil)` pair gets a generated two
/// character alias, drawn in insertion order from a deterministic
/// sequence that skips the interpreter's two-letter reserved words.
#[derive(Default)]
pub struct Variables {
    names: Vec<String>,
    aliases: Vec<String>,
    counter: usize,
}

impl Variables {
    /// Index of a variable, creating its alias on first sight. `None`
    /// signals a reserved name the caller must leave untouched.
    pub fn index_of(&mut self, name: &str, sigil: &str) -> Result<Option<usize>, Error> {
        let key = format!("{}{}", name, sigil);
        if RESERVED_VARS.contains(&key.as_str()) {
            return Ok(None);
        }
        if let Some(index) = self.names.iter().position(|n| *n == key) {
            return Ok(Some(index));
        }
        let alias = self.generate_alias()?;
        // ! and # are alternate numeric markers with no tokenized form
        let suffix = match sigil {
            "!" | "#" => "",
            s => s,
        };
        self.names.push(key);
        self.aliases.push(format!("{}{}", alias, suffix));
        Ok(Some(self.names.len() - 1))
    }

    pub fn alias(&self, index: usize) -> Option<&str> {
        self.aliases.get(index).map(|a| a.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    fn generate_alias(&mut self) -> Result<String, Error> {
        loop {
            let hi = self.counter / ALIAS_SECOND.len();
            let lo = self.counter % ALIAS_SECOND.len();
            if hi >= ALIAS_FIRST.len() {
                return Err(error!(Overflow; "OUT OF VARIABLE NAMES"));
            }
            let alias: String = [ALIAS_FIRST[hi] as char, ALIAS_SECOND[lo] as char]
                .iter()
                .collect();
            self.counter += 1;
            if !RESERVED_PAIRS.contains(&alias.as_str()) {
                return Ok(alias);
            }
        }
    }
}

/// Macro table. First definition of a name wins.
#[derive(Default)]
pub struct Defines {
    names: Vec<String>,
    values: HashMap<String, String>,
}

impl Defines {
    pub fn insert(&mut self, name: &str, value: &str) {
        if !self.values.contains_key(name) {
            self.names.push(name.to_string());
            self.values.insert(name.to_string(), value.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Append-only literal pool indexed by insertion position.
#[derive(Default)]
pub struct Pool {
    items: Vec<String>,
}

impl Pool {
    pub fn push(&mut self, item: &str) -> usize {
        self.items.push(item.to_string());
        self.items.len() - 1
    }

    /// Like `push` but shares the slot of an identical earlier entry.
    pub fn intern(&mut self, item: &str) -> usize {
        match self.items.iter().position(|i| i == item) {
            Some(index) => index,
            None => self.push(item),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|i| i.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
