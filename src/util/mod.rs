//! Shared utilities

pub mod distro;
pub mod fs;

pub use distro::PackageManagerRegistry;

/// Deduplicate preserving first-seen order.
pub fn dedup_first_seen<T>(items: Vec<T>) -> Vec<T>
where
    T: Eq + std::hash::Hash + Clone,
{
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
