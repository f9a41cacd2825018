//! Sources answering "is this variable set?".
//!
//! Verification and presence tagging only ever ask a name → bool question,
//! so every environment source is an [`ExistenceCheck`]. Plain closures
//! qualify through the blanket impl, which keeps test doubles trivial.

mod task_definition;

pub use task_definition::{DefinitionError, TaskDefinition};

/// Answers whether a variable is defined in some environment.
pub trait ExistenceCheck {
    fn exists(&self, name: &str) -> bool;
}

impl<F> ExistenceCheck for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, name: &str) -> bool {
        self(name)
    }
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Value of `name`, or `None` when unset or not valid unicode.
    pub fn lookup(name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl ExistenceCheck for ProcessEnv {
    fn exists(&self, name: &str) -> bool {
        std::env::var_os(name).is_some()
    }
}
