use std::sync::Arc;

use crate::lookup::{Candidate, Lookup};
use crate::type_key::TypeKey;

/// Child registry chained in front of a parent.
///
/// Singular lookups try the child first and fall back to the parent; multi-result
/// lookups yield child matches followed by parent matches. Deeper chains nest
/// composites. No caching happens here: candidates keep whatever slots the
/// wrapped registries attached.
pub struct HierarchicalRegistry {
    parent: Arc<dyn Lookup>,
    child: Arc<dyn Lookup>,
}

impl HierarchicalRegistry {
    #[must_use]
    pub fn new(parent: Arc<dyn Lookup>, child: Arc<dyn Lookup>) -> Self {
        Self { parent, child }
    }

    #[must_use]
    pub fn parent(&self) -> &Arc<dyn Lookup> {
        &self.parent
    }

    #[must_use]
    pub fn child(&self) -> &Arc<dyn Lookup> {
        &self.child
    }
}

impl Lookup for HierarchicalRegistry {
    fn find(&self, key: TypeKey) -> Option<Candidate> {
        self.child.find(key).or_else(|| self.parent.find(key))
    }

    fn find_all(&self, key: TypeKey) -> Vec<Candidate> {
        let mut all = self.child.find_all(key);
        all.extend(self.parent.find_all(key));
        all
    }
}
