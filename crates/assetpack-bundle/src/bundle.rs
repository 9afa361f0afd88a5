//! # Bundle: Sorted, Immutable Resource Collection
//!
//! Resources are held in a name-sorted shared slice. Lookup is a binary
//! search; `put` and `remove` allocate a fresh backing slice and leave every
//! existing [`Bundle`] value untouched. Untouched resources are shared
//! between the old and the new bundle through `Arc`.

use std::sync::Arc;

use crate::resource::Resource;

/// An immutable, name-sorted collection of resources.
///
/// Cloning is O(1).
#[derive(Clone, Default)]
pub struct Bundle {
    resources: Arc<[Arc<Resource>]>,
}

impl Bundle {
    /// Build a bundle from owned resources.
    ///
    /// Input order is irrelevant. When two resources share a name the one
    /// supplied last wins.
    pub fn new(resources: Vec<Resource>) -> Self {
        Self::from_shared(resources.into_iter().map(Arc::new).collect())
    }

    /// Build a bundle from already shared resources.
    pub fn from_shared(mut resources: Vec<Arc<Resource>>) -> Self {
        // Stable sort keeps supplied order among equal names, so keeping the
        // last of each run implements last-wins.
        resources.sort_by(|a, b| a.name().cmp(b.name()));
        let before = resources.len();
        let mut deduped: Vec<Arc<Resource>> = Vec::with_capacity(before);
        for resource in resources {
            match deduped.last_mut() {
                Some(last) if last.name() == resource.name() => *last = resource,
                _ => deduped.push(resource),
            }
        }
        if deduped.len() != before {
            tracing::warn!(
                dropped = before - deduped.len(),
                "duplicate resource names collapsed to the last occurrence"
            );
        }
        Self {
            resources: deduped.into(),
        }
    }

    /// Binary search by name.
    ///
    /// Returns the index of the match, or the index where a resource with
    /// this name would be inserted, together with the match if any.
    pub fn find(&self, name: &str) -> (usize, Option<&Arc<Resource>>) {
        match self
            .resources
            .binary_search_by(|r| r.name().cmp(name))
        {
            Ok(idx) => (idx, Some(&self.resources[idx])),
            Err(idx) => (idx, None),
        }
    }

    /// The resource with this exact name.
    pub fn get(&self, name: &str) -> Option<&Arc<Resource>> {
        self.find(name).1
    }

    /// A new bundle with `resource` added, replacing any same-named entry.
    pub fn put(&self, resource: Resource) -> Self {
        self.put_shared(Arc::new(resource))
    }

    /// As [`Bundle::put`], for a resource that is already shared.
    pub fn put_shared(&self, resource: Arc<Resource>) -> Self {
        let (idx, existing) = self.find(resource.name());
        let mut next: Vec<Arc<Resource>> = self.resources.to_vec();
        if existing.is_some() {
            next[idx] = resource;
        } else {
            next.insert(idx, resource);
        }
        Self {
            resources: next.into(),
        }
    }

    /// A new bundle without `name`. Returns a clone of `self` when absent.
    pub fn remove(&self, name: &str) -> Self {
        let (idx, existing) = self.find(name);
        if existing.is_none() {
            return self.clone();
        }
        let next: Vec<Arc<Resource>> = self
            .resources
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, r)| Arc::clone(r))
            .collect();
        Self {
            resources: next.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Resource>> {
        self.resources.iter()
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.name())
    }

    /// The sorted backing slice.
    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.resources
    }

    /// True if both bundles share the same backing slice.
    pub fn ptr_eq(&self, other: &Bundle) -> bool {
        Arc::ptr_eq(&self.resources, &other.resources)
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl FromIterator<Resource> for Bundle {
    fn from_iter<T: IntoIterator<Item = Resource>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Bundle {
    type Item = &'a Arc<Resource>;
    type IntoIter = std::slice::Iter<'a, Arc<Resource>>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(name: &str) -> Resource {
        Resource::from_bytes(name, name.as_bytes().to_vec())
    }

    fn abc() -> Bundle {
        Bundle::new(vec![res("/c"), res("/a"), res("/b")])
    }

    #[test]
    fn construction_sorts() {
        let b = abc();
        assert_eq!(b.names().collect::<Vec<_>>(), ["/a", "/b", "/c"]);
        assert_eq!(b.len(), 3);
        assert!(!b.is_empty());
    }

    #[test]
    fn find_hit_and_miss() {
        let b = abc();
        let (idx, found) = b.find("/b");
        assert_eq!(idx, 1);
        assert_eq!(found.map(|r| r.name()), Some("/b"));

        let (idx, found) = b.find("/z");
        assert_eq!(idx, 3);
        assert!(found.is_none());

        let (idx, found) = b.find("/aa");
        assert_eq!(idx, 1);
        assert!(found.is_none());
    }

    #[test]
    fn put_inserts_in_order_and_leaves_receiver() {
        let b = abc();
        let b2 = b.put(res("/aa"));
        assert_eq!(b2.names().collect::<Vec<_>>(), ["/a", "/aa", "/b", "/c"]);
        assert_eq!(b.len(), 3);
        assert!(b.get("/aa").is_none());
    }

    #[test]
    fn put_replaces_same_name() {
        let b = abc();
        let replacement = Resource::from_bytes("/b", b"new".to_vec());
        let b2 = b.put(replacement);
        assert_eq!(b2.len(), 3);
        assert_eq!(&b2.get("/b").unwrap().unpacked().unwrap()[..], b"new");
        assert_eq!(&b.get("/b").unwrap().unpacked().unwrap()[..], b"/b");
    }

    #[test]
    fn put_shares_untouched_resources() {
        let b = abc();
        let b2 = b.put(res("/d"));
        assert!(Arc::ptr_eq(b.get("/a").unwrap(), b2.get("/a").unwrap()));
    }

    #[test]
    fn remove_present_and_absent() {
        let b = abc();
        let b2 = b.remove("/b");
        assert_eq!(b2.names().collect::<Vec<_>>(), ["/a", "/c"]);
        assert_eq!(b.len(), 3);

        let same = b.remove("/nope");
        assert!(same.ptr_eq(&b));
        assert_eq!(
            same.names().collect::<Vec<_>>(),
            b.names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn duplicates_collapse_to_last() {
        let first = Resource::from_bytes("/dup", b"first".to_vec());
        let second = Resource::from_bytes("/dup", b"second".to_vec());
        let b = Bundle::new(vec![first, res("/a"), second]);
        assert_eq!(b.len(), 2);
        assert_eq!(&b.get("/dup").unwrap().unpacked().unwrap()[..], b"second");
    }

    #[test]
    fn empty_bundle() {
        let b = Bundle::default();
        assert!(b.is_empty());
        let (idx, found) = b.find("/x");
        assert_eq!(idx, 0);
        assert!(found.is_none());
        let b2 = b.put(res("/x"));
        assert_eq!(b2.len(), 1);
    }

    #[test]
    fn collect_from_iterator() {
        let b: Bundle = ["/z", "/y"].into_iter().map(res).collect();
        let names: Vec<&str> = (&b).into_iter().map(|r| r.name()).collect();
        assert_eq!(names, ["/y", "/z"]);
    }
}
