use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A map of payment method id to an opaque descriptor.
///
/// Filtering only ever looks up and removes keys; descriptors are never read
/// or modified.
pub trait GatewayRegistry {
    fn contains_method(&self, id: &str) -> bool;

    /// Remove a method. Returns `true` if it was present.
    fn remove_method(&mut self, id: &str) -> bool;

    fn method_count(&self) -> usize;
}

impl<D, S: BuildHasher> GatewayRegistry for HashMap<String, D, S> {
    fn contains_method(&self, id: &str) -> bool {
        self.contains_key(id)
    }

    fn remove_method(&mut self, id: &str) -> bool {
        self.remove(id).is_some()
    }

    fn method_count(&self) -> usize {
        self.len()
    }
}

impl<D> GatewayRegistry for BTreeMap<String, D> {
    fn contains_method(&self, id: &str) -> bool {
        self.contains_key(id)
    }

    fn remove_method(&mut self, id: &str) -> bool {
        self.remove(id).is_some()
    }

    fn method_count(&self) -> usize {
        self.len()
    }
}
