//! Disjoint-set forest over pattern aliases.
//!
//! Keys are lower-cased so `A` and `a` name the same set. There is no rank
//! heuristic: `union` always roots the first set under the second, which is
//! fine for the handful of aliases a MATCH clause carries.

use std::collections::HashMap;

use super::errors::PatternGraphError;

#[derive(Debug, Default, Clone)]
pub struct UnionFind {
    parent: HashMap<String, String>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` as a singleton set. Re-registering is a no-op.
    pub fn register(&mut self, alias: &str) {
        let key = alias.to_lowercase();
        self.parent.entry(key.clone()).or_insert(key);
    }

    /// Root of the set containing `alias`, compressing the walked path.
    pub fn find(&mut self, alias: &str) -> Result<String, PatternGraphError> {
        let key = alias.to_lowercase();
        let mut current = key.clone();
        let mut visited = Vec::new();
        loop {
            let parent = self
                .parent
                .get(&current)
                .ok_or_else(|| PatternGraphError::UnregisteredAlias(alias.to_string()))?;
            if *parent == current {
                break;
            }
            visited.push(current);
            current = parent.clone();
        }
        for node in visited {
            self.parent.insert(node, current.clone());
        }
        Ok(current)
    }

    /// Root `a`'s set under `b`'s root.
    pub fn union(&mut self, a: &str, b: &str) -> Result<(), PatternGraphError> {
        let root_a = self.find(a)?;
        let root_b = self.find(b)?;
        if root_a != root_b {
            self.parent.insert(root_a, root_b);
        }
        Ok(())
    }

    /// Number of distinct sets.
    pub fn set_count(&self) -> usize {
        self.parent.iter().filter(|(k, v)| k == v).count()
    }
}
