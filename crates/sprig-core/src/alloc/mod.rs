//! Storage for document nodes and layout caches.
//!
//! - [`SparseSet`]: generational arena; released slots make old
//!   [`IndexSlot`]s fail lookups instead of aliasing new data
//! - [`HashMap`]: `ahash`-backed map used for per-node side tables

pub mod sparse_set;

pub use ahash::AHashMap as HashMap;
pub use sparse_set::{IndexSlot, SparseSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_table_keyed_by_slot() {
        let mut set = SparseSet::new();
        let a = set.push("a");
        let b = set.push("b");

        let mut widths: HashMap<IndexSlot, f32> = HashMap::new();
        widths.insert(a, 10.0);
        widths.insert(b, 20.0);

        set.remove(a);
        widths.retain(|slot, _| set.contains(*slot));
        assert_eq!(widths.len(), 1);
        assert_eq!(widths.get(&b), Some(&20.0));
    }
}
