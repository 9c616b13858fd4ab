use crate::attrs::Attr;
use std::sync::Arc;

/// One derivation step: either "open this group" or "add these attributes".
#[derive(Debug)]
enum Step {
    Group(String),
    Attrs(Vec<Attr>),
}

#[derive(Debug)]
struct Node {
    step: Step,
    parent: Option<Arc<Node>>,
}

/// Persistent record of a logger lineage's `with`/`with_group` calls.
///
/// The list is built newest-first and structurally shared: deriving a chain
/// allocates one node and points it at the old head, so concurrent loggers
/// holding ancestor chains never observe a mutation. No-op derivations
/// (empty group name, empty attribute list) return a chain sharing the same
/// head instead of allocating.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    head: Option<Arc<Node>>,
}

impl Chain {
    pub fn new() -> Self {
        Chain::default()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Push a group-opening step. An empty name is elided entirely.
    pub fn with_group(&self, name: &str) -> Chain {
        if name.is_empty() {
            return self.clone();
        }
        Chain {
            head: Some(Arc::new(Node {
                step: Step::Group(name.to_owned()),
                parent: self.head.clone(),
            })),
        }
    }

    /// Push an attribute-adding step. An empty list is elided entirely.
    ///
    /// The attributes are stored by value, so later changes to the caller's
    /// buffer cannot reach the chain.
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Chain {
        if attrs.is_empty() {
            return self.clone();
        }
        Chain {
            head: Some(Arc::new(Node {
                step: Step::Attrs(attrs),
                parent: self.head.clone(),
            })),
        }
    }

    /// Fold the chain over an accumulated attribute list.
    ///
    /// Walks head to tail (newest derivation first). A group step wraps the
    /// entire accumulator into one group-valued attribute; an attribute
    /// step prepends its attributes. The walk re-linearizes everything into
    /// oldest-to-newest order with correct group nesting.
    pub fn apply(&self, mut attrs: Vec<Attr>) -> Vec<Attr> {
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            match &node.step {
                Step::Group(name) => {
                    attrs = vec![Attr::group(name.clone(), attrs)];
                }
                Step::Attrs(own) => {
                    let mut merged = own.clone();
                    merged.extend(attrs);
                    attrs = merged;
                }
            }
            cursor = node.parent.as_deref();
        }
        attrs
    }
}
