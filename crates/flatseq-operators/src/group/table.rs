//! Grouping table: `(key, element buffer)` entries in first-seen key order.
//!
//! Keys are only equality-comparable, so lookup is a linear probe over the
//! existing groups. The table array and each group buffer grow by doubling.

use flatseq_mem::{Allocator, ArenaBuf, Growth};

use crate::compare::EqualityComparer;
use crate::metrics;
use crate::source::SliceSeq;
use crate::traits::SeqResult;

/// One group: a key and the elements that mapped to it, in source order.
#[derive(Debug)]
pub struct Grouping<K, E> {
    key: K,
    elements: ArenaBuf<E>,
}

impl<K, E> Grouping<K, E> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Hand the group buffer to the caller, who then owns its release.
    pub fn into_parts(self) -> (K, ArenaBuf<E>) {
        (self.key, self.elements)
    }
}

impl<K, E: Copy> Grouping<K, E> {
    /// The group's elements as a source for further stages.
    pub fn as_seq(&self) -> SliceSeq<'_, E> {
        SliceSeq::new(&self.elements)
    }
}

#[derive(Debug)]
pub struct GroupingTable<K, E> {
    groups: ArenaBuf<Grouping<K, E>>,
    alloc: Allocator,
    group_capacity: usize,
}

impl<K, E> GroupingTable<K, E> {
    /// Empty table sized from the allocator's configured capacities.
    pub fn new(alloc: &Allocator) -> SeqResult<Self> {
        let caps = alloc.capacities();
        Self::with_capacity(alloc, caps.group_table_initial, caps.group_initial)
    }

    pub fn with_capacity(
        alloc: &Allocator,
        table_capacity: usize,
        group_capacity: usize,
    ) -> SeqResult<Self> {
        let groups = ArenaBuf::with_capacity(alloc, table_capacity, "group_table")?
            .with_growth(Growth::Double);
        Ok(Self {
            groups,
            alloc: alloc.clone(),
            group_capacity: group_capacity.max(1),
        })
    }

    /// Append `element` to the group for `key`, opening a new group on a miss.
    pub fn insert<Q>(&mut self, key: K, element: E, eq: &Q) -> SeqResult<()>
    where
        Q: EqualityComparer<K>,
    {
        let slot = match self.groups.iter().position(|g| eq.equals(&g.key, &key)) {
            Some(slot) => slot,
            None => {
                let elements = ArenaBuf::with_capacity(&self.alloc, self.group_capacity, "group")?
                    .with_growth(Growth::Double);
                self.groups.push(Grouping { key, elements })?;
                self.groups.len() - 1
            }
        };
        self.groups[slot].elements.push(element)?;
        Ok(())
    }

    pub fn groups(&self) -> &[Grouping<K, E>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Bytes held by the table array plus every group buffer.
    pub fn accounted_bytes(&self) -> usize {
        self.groups.accounted_bytes()
            + self
                .groups
                .iter()
                .map(|g| g.elements.accounted_bytes())
                .sum::<usize>()
    }

    /// Shallow disposal: the table array goes away as it is drained, and each
    /// yielded `Grouping` owns its element buffer from then on.
    pub fn into_groups(mut self) -> IntoGroups<K, E> {
        self.groups.reverse();
        IntoGroups {
            table: Some(self.groups),
        }
    }

    /// Recursive disposal: the table and every group buffer are released.
    pub fn dispose_recursive(self) {
        metrics::stage_released("group_table", self.accounted_bytes());
        drop(self);
    }
}

/// Groups handed out in first-seen key order.
pub struct IntoGroups<K, E> {
    // Stored reversed so each step is a `pop`.
    table: Option<ArenaBuf<Grouping<K, E>>>,
}

impl<K, E> IntoGroups<K, E> {
    pub(crate) fn empty() -> Self {
        Self { table: None }
    }

    pub fn remaining(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.len())
    }
}

impl<K, E> Iterator for IntoGroups<K, E> {
    type Item = Grouping<K, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table.as_mut()?;
        let next = table.pop();
        if next.is_none() {
            if let Some(table) = self.table.take() {
                metrics::stage_released("group_table", table.accounted_bytes());
            }
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<K, E> ExactSizeIterator for IntoGroups<K, E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::DefaultEq;

    #[test]
    fn test_first_seen_key_order() {
        let alloc = Allocator::unbounded();
        let mut table = GroupingTable::with_capacity(&alloc, 1, 1).unwrap();
        for (k, v) in [('b', 1), ('a', 2), ('b', 3), ('c', 4), ('a', 5)] {
            table.insert(k, v, &DefaultEq).unwrap();
        }
        let keys: Vec<char> = table.groups().iter().map(|g| *g.key()).collect();
        assert_eq!(keys, vec!['b', 'a', 'c']);
        assert_eq!(table.groups()[0].elements(), &[1, 3]);
        assert_eq!(table.groups()[1].elements(), &[2, 5]);
    }

    #[test]
    fn test_custom_equality_merges_keys() {
        let alloc = Allocator::unbounded();
        let mut table = GroupingTable::new(&alloc).unwrap();
        let same_parity = |a: &i32, b: &i32| a % 2 == b % 2;
        for v in [1, 2, 3, 4, 5] {
            table.insert(v, v, &same_parity).unwrap();
        }
        assert_eq!(table.len(), 2);
        assert_eq!(table.groups()[0].elements(), &[1, 3, 5]);
    }

    #[test]
    fn test_shallow_disposal_hands_buffers_to_caller() {
        let alloc = Allocator::unbounded();
        let mut table = GroupingTable::with_capacity(&alloc, 2, 2).unwrap();
        table.insert(1u8, 10u32, &DefaultEq).unwrap();
        table.insert(2u8, 20u32, &DefaultEq).unwrap();

        let mut groups = table.into_groups();
        let first = groups.next().unwrap();
        let second = groups.next().unwrap();
        assert!(groups.next().is_none());
        drop(groups);

        // Only the two group buffers remain accounted.
        assert_eq!(alloc.used_bytes(), 2 * 2 * 4);
        assert_eq!(*first.key(), 1);
        assert_eq!(second.elements(), &[20]);
        drop((first, second));
        assert_eq!(alloc.used_bytes(), 0);
    }

    #[test]
    fn test_recursive_disposal_releases_everything() {
        let alloc = Allocator::unbounded();
        let mut table = GroupingTable::new(&alloc).unwrap();
        for v in 0..100u32 {
            table.insert(v % 7, v, &DefaultEq).unwrap();
        }
        assert!(alloc.used_bytes() > 0);
        table.dispose_recursive();
        assert_eq!(alloc.used_bytes(), 0);
    }
}
