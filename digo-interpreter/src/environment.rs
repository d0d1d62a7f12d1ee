use crate::object::Object;
use gc::{Finalize, Gc, GcCell, Trace};
use std::collections::HashMap;

#[derive(Trace, Finalize)]
pub struct EnvironmentCore {
    store: HashMap<String, Gc<Object>>,
    outer: Option<Environment>,
}

/// A scope of bindings, shared between every closure defined inside it.
///
/// Cloning the handle does not copy the bindings.
#[derive(Clone, Trace, Finalize)]
pub struct Environment {
    environment: Gc<GcCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: None,
            })),
        }
    }

    pub fn new_enclosed(outer: Environment) -> Environment {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: Some(outer),
            })),
        }
    }

    /// Looks `key` up in this scope and then in each enclosing one.
    pub fn get(&self, key: &str) -> Option<Gc<Object>> {
        let env = self.environment.borrow();
        match env.store.get(key) {
            Some(value) => Some(value.clone()),
            None => env.outer.as_ref().and_then(|outer| outer.get(key)),
        }
    }

    /// Binds `key` in this scope only, shadowing any outer binding.
    pub fn set(&mut self, key: &str, value: Gc<Object>) {
        self.environment
            .borrow_mut()
            .store
            .insert(key.to_owned(), value);
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Gc::ptr_eq(&self.environment, &other.environment)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// Bindings can hold closures that point back at this environment, so only
// the local names are printed.
impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env = self.environment.borrow();
        let mut names = env.store.keys().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("enclosed", &env.outer.is_some())
            .finish()
    }
}
