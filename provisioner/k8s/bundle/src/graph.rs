use crate::{DerivationError, PlannedResource, ResourceId};
use ahash::AHashMap as HashMap;
use std::collections::BTreeSet;
use tracing::debug;

/// Planned resources keyed by identity, with the edges their `depends_on` lists describe.
///
/// Edges are only resolved when the graph is sorted, so resources may be inserted in any order.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<PlannedResource>,
    index: HashMap<ResourceId, usize>,
}

// === impl DependencyGraph ===

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, resource: PlannedResource) -> Result<(), DerivationError> {
        if self.index.contains_key(&resource.id) {
            return Err(DerivationError::DuplicateResource(resource.id));
        }
        self.index.insert(resource.id.clone(), self.nodes.len());
        self.nodes.push(resource);
        Ok(())
    }

    pub fn extend(
        &mut self,
        resources: impl IntoIterator<Item = PlannedResource>,
    ) -> Result<(), DerivationError> {
        for resource in resources {
            self.insert(resource)?;
        }
        Ok(())
    }

    /// Orders resources so that every resource follows all of its dependencies.
    ///
    /// Uses Kahn's algorithm. Among resources that are ready at the same time, the one inserted
    /// first is emitted first, so the output is fully determined by the insertion order.
    pub fn into_sorted(self) -> Result<Vec<PlannedResource>, DerivationError> {
        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents = vec![Vec::new(); n];

        for (i, node) in self.nodes.iter().enumerate() {
            for dep in &node.depends_on {
                let j = *self
                    .index
                    .get(dep)
                    .ok_or_else(|| DerivationError::UnknownDependency {
                        resource: node.id.clone(),
                        dependency: dep.clone(),
                    })?;
                in_degree[i] += 1;
                dependents[j].push(i);
            }
        }

        let mut ready = (0..n).filter(|&i| in_degree[i] == 0).collect::<BTreeSet<_>>();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &d in &dependents[i] {
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() < n {
            let stuck = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.nodes[i].id.clone())
                .collect();
            return Err(DerivationError::Cycle(stuck));
        }

        debug!(resources = n, "sorted dependency graph");

        let mut slots = self.nodes.into_iter().map(Some).collect::<Vec<_>>();
        Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
    }
}
