//! Dense indexing of task identifiers.
//!
//! The graph stores every per-task table as a `Vec` addressed by the task's
//! position in the declared task list, so lookups during traversal are plain
//! array accesses. Strings only appear at the API boundary.

use rustc_hash::FxHashMap;

/// Position of a task in declaration order.
pub type TaskIdx = u32;

/// Bidirectional map between task identifiers and their declaration index.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    by_name: FxHashMap<String, TaskIdx>,
    names: Vec<String>,
}

impl TaskIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_name: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Register a task, assigning it the next index.
    ///
    /// Returns `Err` with the existing index if the name was already declared;
    /// the first declaration keeps its position.
    pub fn declare(&mut self, name: &str) -> Result<TaskIdx, TaskIdx> {
        if let Some(&idx) = self.by_name.get(name) {
            return Err(idx);
        }
        let idx = self.names.len() as TaskIdx;
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), idx);
        Ok(idx)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<TaskIdx> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Name of a declared task. Panics on an index this map never handed out.
    #[inline]
    pub fn name(&self, idx: TaskIdx) -> &str {
        &self.names[idx as usize]
    }

    /// Declared names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
