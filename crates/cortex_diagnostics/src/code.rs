//! Diagnostic codes with subsystem prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subsystem that produced a diagnostic, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// File materialization (symlink/copy), prefixed with `M`.
    Materialize,
    /// Content and timestamp hashing, prefixed with `H`.
    Hash,
    /// Resource estimation, prefixed with `R`.
    Estimate,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Materialize => 'M',
            Category::Hash => 'H',
            Category::Estimate => 'R',
        }
    }
}

/// A category prefix plus a numeric identifier, displayed as e.g. `M101`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The producing subsystem.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
