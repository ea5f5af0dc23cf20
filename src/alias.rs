//! Alias assignment.
//!
//! Before rendering, the compiler walks the tree in FROM-clause order (left
//! side of a join before its right side, depth first) and gives every table
//! or alias occurrence a display name. The first occurrence of a base table
//! keeps the table's name; later occurrences are numbered `_2`, `_3`, and so
//! on. Selections are transparent and never take a name. The names depend
//! only on the shape of the tree, never on the values of node identities.
//!
//! Every occurrence must be a distinct relation. A relation reached twice by
//! the walk would need two names for one identity, so the pass rejects it;
//! a self-join goes through `alias()` instead.

use std::collections::{HashMap, HashSet};

use crate::error::Error;
use crate::map::OrderMap;
use crate::relation::{Kind, NodeId, Relation};

/// The display names assigned during one compilation.
#[derive(Debug)]
pub struct Names {
    /// Names of table and alias occurrences, in traversal order.
    occurrences: OrderMap<NodeId, String>,
    /// The nodes inside each aliased occurrence.
    members: HashMap<NodeId, HashSet<NodeId>>,
    /// For nodes inside an alias, the first alias that contains them.
    enclosing: HashMap<NodeId, NodeId>,
}

/// State of the naming walk.
struct Pass {
    names: Names,
    /// How many occurrences of each base name have been seen.
    counts: HashMap<String, usize>,
    /// Display names already handed out.
    taken: HashSet<String>,
}

impl Names {
    /// Assigns display names to every occurrence in the tree.
    pub fn assign(root: &Relation) -> Result<Names, Error> {
        let mut pass = Pass {
            names: Names {
                occurrences: OrderMap::new(),
                members: HashMap::new(),
                enclosing: HashMap::new(),
            },
            counts: HashMap::new(),
            taken: HashSet::new(),
        };
        pass.visit(root)?;
        debug!(
            "Assigned {} name(s): {:?}",
            pass.names.len(),
            pass.names.iter().map(|(_, name)| name).collect::<Vec<_>>()
        );
        Ok(pass.names)
    }

    /// Returns the name of a table or alias occurrence.
    pub fn get(&self, id: NodeId) -> Option<&str> {
        self.occurrences.get(id).map(String::as_str)
    }

    /// Returns the number of named occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Returns the names in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.occurrences.iter().map(|(id, name)| (id, name.as_str()))
    }

    /// Returns the name under which `id` is visible from inside `scope`.
    ///
    /// The scope lists the aliases being rendered, outermost first. Inside an
    /// alias, every relation it wraps goes by the alias's name. Outside any
    /// alias, occurrences go by their own name, and relations that only occur
    /// inside an alias go by the name of the first such alias.
    pub fn resolve(&self, id: NodeId, scope: &[NodeId]) -> Option<&str> {
        for &alias in scope.iter().rev() {
            if let Some(members) = self.members.get(&alias) {
                if alias == id || members.contains(&id) {
                    return self.get(alias);
                }
            }
        }
        self.get(id)
            .or_else(|| self.enclosing.get(&id).and_then(|&a| self.get(a)))
    }
}

impl Pass {
    fn visit(&mut self, rel: &Relation) -> Result<(), Error> {
        match rel.kind() {
            Kind::Table { .. } => self.name(rel),
            Kind::Alias { inner } => {
                self.name(rel)?;
                let mut members = HashSet::new();
                collect_ids(inner, &mut members);
                for &id in &members {
                    self.names.enclosing.entry(id).or_insert(rel.id());
                }
                self.names.members.insert(rel.id(), members);
                Ok(())
            }
            Kind::Selection { inner, .. } => self.visit(inner),
            Kind::Join { left, right, .. } => {
                self.visit(left)?;
                self.visit(right)
            }
        }
    }

    /// Names a table or alias occurrence.
    fn name(&mut self, rel: &Relation) -> Result<(), Error> {
        if self.names.occurrences.contains(rel.id()) {
            return Err(Error::MalformedTree(
                "relation occurs more than once; alias it",
            ));
        }
        let base = rel.base_name()?;
        let count = self.counts.entry(base.to_string()).or_insert(0);
        let mut name;
        loop {
            *count += 1;
            name = if *count == 1 {
                base.to_string()
            } else {
                format!("{}_{}", base, count)
            };
            if !self.taken.contains(&name) {
                break;
            }
        }
        debug!("Named occurrence {:?} of `{}` as `{}`", rel.id(), base, name);
        self.taken.insert(name.clone());
        self.names.occurrences.insert(rel.id(), name);
        Ok(())
    }
}

/// Adds the identities of every node in the tree to `ids`.
fn collect_ids(rel: &Relation, ids: &mut HashSet<NodeId>) {
    ids.insert(rel.id());
    match rel.kind() {
        Kind::Table { .. } => (),
        Kind::Alias { inner } | Kind::Selection { inner, .. } => {
            collect_ids(inner, ids)
        }
        Kind::Join { left, right, .. } => {
            collect_ids(left, ids);
            collect_ids(right, ids);
        }
    }
}
