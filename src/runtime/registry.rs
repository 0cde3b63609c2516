//! Registry of loaded module instances
//!
//! Instances live in an append-only arena for the whole run and are addressed
//! by [`InstanceId`]. The registry tracks which instance is current (the most
//! recently loaded module) and which instances were loaded under a name.

use std::collections::HashMap;

/// Handle to an instance held by an [`InstanceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(usize);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no module loaded")]
    NoCurrentModule,
    #[error("named module not found: {0}")]
    NamedModuleNotFound(String),
}

pub struct InstanceRegistry<I> {
    instances: Vec<I>,
    current: Option<InstanceId>,
    named: HashMap<String, InstanceId>,
}

impl<I> InstanceRegistry<I> {
    pub fn new() -> Self {
        InstanceRegistry {
            instances: Vec::new(),
            current: None,
            named: HashMap::new(),
        }
    }

    /// Take ownership of an instance, returning its handle. The current
    /// instance is not changed.
    pub fn insert(&mut self, instance: I) -> InstanceId {
        self.instances.push(instance);
        InstanceId(self.instances.len() - 1)
    }

    pub fn set_current(&mut self, id: InstanceId) {
        self.current = Some(id);
    }

    /// Bind `name` to `id`, replacing any earlier binding.
    pub fn bind(&mut self, name: impl Into<String>, id: InstanceId) {
        self.named.insert(name.into(), id);
    }

    pub fn current(&self) -> Option<InstanceId> {
        self.current
    }

    /// Resolve an action's target. `None` or an empty name selects the
    /// current instance; any other name must have been bound.
    pub fn resolve(&self, name: Option<&str>) -> Result<InstanceId, RegistryError> {
        match name {
            None | Some("") => self.current.ok_or(RegistryError::NoCurrentModule),
            Some(name) => self
                .named
                .get(name)
                .copied()
                .ok_or_else(|| RegistryError::NamedModuleNotFound(name.to_string())),
        }
    }

    pub fn get(&self, id: InstanceId) -> &I {
        &self.instances[id.0]
    }

    pub fn get_mut(&mut self, id: InstanceId) -> &mut I {
        &mut self.instances[id.0]
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl<I> Default for InstanceRegistry<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_has_no_current() {
        let registry: InstanceRegistry<&str> = InstanceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve(None), Err(RegistryError::NoCurrentModule));
        assert_eq!(registry.resolve(Some("")), Err(RegistryError::NoCurrentModule));
    }

    #[test]
    fn test_unnamed_resolves_to_latest_current() {
        let mut registry = InstanceRegistry::new();
        let a = registry.insert("a");
        registry.set_current(a);
        registry.bind("A", a);
        let b = registry.insert("b");
        registry.set_current(b);
        let c = registry.insert("c");
        registry.set_current(c);
        registry.bind("C", c);

        assert_eq!(registry.resolve(None), Ok(c));
        assert_eq!(*registry.get(registry.resolve(Some("")).unwrap()), "c");
        assert_eq!(registry.resolve(Some("A")), Ok(a));
    }

    #[test]
    fn test_unknown_name_fails_even_with_current() {
        let mut registry = InstanceRegistry::new();
        let a = registry.insert(1);
        registry.set_current(a);
        assert_eq!(
            registry.resolve(Some("Unknown")),
            Err(RegistryError::NamedModuleNotFound("Unknown".to_string()))
        );

        let empty: InstanceRegistry<i32> = InstanceRegistry::new();
        assert_eq!(
            empty.resolve(Some("Unknown")),
            Err(RegistryError::NamedModuleNotFound("Unknown".to_string()))
        );
    }

    #[test]
    fn test_rebinding_name_returns_second_instance() {
        let mut registry = InstanceRegistry::new();
        let first = registry.insert("first");
        registry.bind("M", first);
        let second = registry.insert("second");
        registry.bind("M", second);

        let id = registry.resolve(Some("M")).unwrap();
        assert_eq!(id, second);
        assert_eq!(*registry.get(id), "second");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_insert_does_not_change_current() {
        let mut registry = InstanceRegistry::new();
        let a = registry.insert(1);
        registry.set_current(a);
        registry.insert(2);
        assert_eq!(registry.current(), Some(a));
    }

    #[test]
    fn test_get_mut_updates_instance() {
        let mut registry = InstanceRegistry::new();
        let id = registry.insert(vec![1]);
        registry.get_mut(id).push(2);
        assert_eq!(registry.get(id), &vec![1, 2]);
    }
}
