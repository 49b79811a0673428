//! The module registry: the only interface the core needs onto the
//! bundled runtime support libraries (math, iter-tools, the GUI wrapper).
//!
//! Those libraries themselves are out of scope for the translator — it
//! never reads their sources. It only needs, per module identifier, the
//! header path to `#include` and the `using`-declaration to emit. That's
//! exactly what this registry holds, fixed at construction and read-only
//! thereafter.

use std::collections::BTreeMap;

/// Header path and `using`-declaration for one importable module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub header: String,
    pub using_decl: String,
}

impl ModuleEntry {
    pub fn new(header: impl Into<String>, using_decl: impl Into<String>) -> Self {
        ModuleEntry {
            header: header.into(),
            using_decl: using_decl.into(),
        }
    }
}

/// Lookup table from module identifier (as written in `import X`) to its
/// [`ModuleEntry`]. Construction is the only place entries can be added;
/// lookups never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleEntry>,
}

impl ModuleRegistry {
    /// An empty registry, useful as a starting point for `with_module`.
    pub fn empty() -> Self {
        ModuleRegistry {
            modules: BTreeMap::new(),
        }
    }

    /// The three bindings the translator ships with: `BIFMath`,
    /// `BIFitertools`, `BIFtkinter`.
    pub fn standard() -> Self {
        let mut modules = BTreeMap::new();
        modules.insert(
            "BIFMath".to_string(),
            ModuleEntry::new("libs/BIFMath/BIFMath.h", "using bif::math::BIFMath;"),
        );
        modules.insert(
            "BIFitertools".to_string(),
            ModuleEntry::new(
                "libs/BIFitertools/BIFitertools.h",
                "using bif::itertools::BIFitertools;",
            ),
        );
        modules.insert(
            "BIFtkinter".to_string(),
            ModuleEntry::new("libs/BIFtkinter/BIFtkinter.h", "using bif::tkinter::BIFWindow;"),
        );
        ModuleRegistry { modules }
    }

    /// Register (or override) a module entry, builder-style, so embedders
    /// can extend the registry without forking the core.
    pub fn with_module(mut self, name: impl Into<String>, entry: ModuleEntry) -> Self {
        self.modules.insert(name.into(), entry);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        ModuleRegistry::standard()
    }
}
