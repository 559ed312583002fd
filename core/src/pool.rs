//! Per-document interning of line content.
//!
//! Text files repeat lines heavily (blank lines, braces, boilerplate), so panes
//! store [`LineId`]s into their document's pool instead of owned strings. The
//! pool only ever grows; ids stay valid for the document's lifetime, which is
//! what lets undo transactions snapshot pane content as plain id vectors.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(pub u32);

#[derive(Debug, Default)]
pub struct LinePool {
    contents: Vec<String>,
    index: FxHashMap<u64, Vec<LineId>>,
}

impl LinePool {
    pub fn new() -> Self {
        let mut pool = Self::default();
        pool.intern("");
        pool
    }

    pub fn intern(&mut self, content: &str) -> LineId {
        let h = hash_content(content);
        let bucket = self.index.entry(h).or_default();
        for &id in bucket.iter() {
            if self.contents[id.0 as usize] == content {
                return id;
            }
        }
        let id = LineId(self.contents.len() as u32);
        self.contents.push(content.to_owned());
        bucket.push(id);
        id
    }

    pub fn resolve(&self, id: LineId) -> &str {
        &self.contents[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

fn hash_content(content: &str) -> u64 {
    let mut hasher = FxHasher::default();
    content.hash(&mut hasher);
    hasher.finish()
}
