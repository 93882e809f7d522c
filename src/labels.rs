//! # Branch Label Resolution
//!
//! Relative branches encode a signed offset from the position of the next
//! instruction. Because that position is always known at decode time, the
//! absolute target is computable immediately for both forward and backward
//! branches — no second pass is needed. This module maps those absolute
//! positions to stable generated names.

use std::collections::HashMap;

/// Maps absolute stream positions to generated label names.
///
/// Names are `label_N`, numbered in order of first reference. Entries are
/// never removed or reassigned, so resolving the same position twice
/// always yields the same name. One table is created per decode run.
///
/// # Examples
///
/// ```
/// use disasm8086::labels::LabelTable;
///
/// let mut labels = LabelTable::new();
/// assert_eq!(labels.resolve(17), "label_0");
/// assert_eq!(labels.resolve(3), "label_1");
/// assert_eq!(labels.resolve(17), "label_0");
/// ```
#[derive(Debug, Default)]
pub struct LabelTable {
    names: HashMap<u64, String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label name for `position`, generating and inserting a
    /// new sequential name on first reference.
    pub fn resolve(&mut self, position: u64) -> &str {
        let next = self.names.len();
        self.names
            .entry(position)
            .or_insert_with(|| format!("label_{}", next))
    }

    /// Number of distinct positions referenced so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
