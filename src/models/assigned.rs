//! Set of customers already committed to a route.

/// Bitmap over node ids recording which customers have been committed.
///
/// Owned by one construction run and passed by reference to the state
/// transition; customers themselves carry no "assigned" flag.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::AssignedSet;
///
/// let mut set = AssignedSet::new(5);
/// assert!(set.insert(3));
/// assert!(!set.insert(3));
/// assert!(set.contains(3));
/// assert!(!set.contains(9));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignedSet {
    bits: Vec<bool>,
    count: usize,
}

impl AssignedSet {
    /// Creates an empty set able to hold ids `0..=max_id`. Node ids are
    /// bounded by [`MAX_NODE_ID`](super::MAX_NODE_ID), which keeps the
    /// bitmap small.
    pub fn new(max_id: usize) -> Self {
        Self {
            bits: vec![false; max_id + 1],
            count: 0,
        }
    }

    /// Marks `id` as assigned. Returns `false` if it already was.
    pub fn insert(&mut self, id: usize) -> bool {
        if id >= self.bits.len() {
            self.bits.resize(id + 1, false);
        }
        if self.bits[id] {
            return false;
        }
        self.bits[id] = true;
        self.count += 1;
        true
    }

    /// Returns `true` if `id` has been assigned.
    pub fn contains(&self, id: usize) -> bool {
        self.bits.get(id).copied().unwrap_or(false)
    }

    /// Number of assigned ids.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if nothing has been assigned yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Assigned ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(id, &set)| set.then_some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grows_past_initial_size() {
        let mut s = AssignedSet::new(2);
        assert!(s.insert(10));
        assert!(s.contains(10));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_count_ignores_duplicates() {
        let mut s = AssignedSet::new(4);
        assert!(s.is_empty());
        s.insert(1);
        s.insert(4);
        s.insert(1);
        assert_eq!(s.len(), 2);
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![1, 4]);
    }
}
