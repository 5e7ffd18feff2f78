//! Owner-or-public visibility rules
//!
//! Resources record the key hash of their creator. A caller sees a resource
//! when it is public or when the caller's key hash equals the owner hash.

use crate::constant_time_eq;

/// A resource scoped to the API key that created it
pub trait Owned {
    /// Key hash of the creator, absent for system-owned resources
    fn owner_hash(&self) -> Option<&str>;

    /// Whether every caller may see the resource
    fn is_public(&self) -> bool;
}

/// Whether `caller` (a key hash) may see `item`
///
/// Without a caller only public resources are visible.
pub fn is_visible_to<T: Owned + ?Sized>(item: &T, caller: Option<&str>) -> bool {
    if item.is_public() {
        return true;
    }

    match (item.owner_hash(), caller) {
        (Some(owner), Some(caller)) => constant_time_eq(owner, caller),
        _ => false,
    }
}

/// Keep only the items visible to `caller`, preserving order
pub fn filter_visible<T: Owned>(items: impl IntoIterator<Item = T>, caller: Option<&str>) -> Vec<T> {
    items.into_iter().filter(|item| is_visible_to(item, caller)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Preset {
        name: &'static str,
        owner: Option<&'static str>,
        public: bool,
    }

    impl Owned for Preset {
        fn owner_hash(&self) -> Option<&str> {
            self.owner
        }

        fn is_public(&self) -> bool {
            self.public
        }
    }

    fn presets() -> Vec<Preset> {
        vec![
            Preset { name: "shared", owner: Some("aaa"), public: true },
            Preset { name: "mine", owner: Some("bbb"), public: false },
            Preset { name: "theirs", owner: Some("ccc"), public: false },
            Preset { name: "orphan", owner: None, public: false },
        ]
    }

    #[test]
    fn owner_sees_own_and_public() {
        let names: Vec<_> = filter_visible(presets(), Some("bbb")).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["shared", "mine"]);
    }

    #[test]
    fn anonymous_caller_sees_only_public() {
        let names: Vec<_> = filter_visible(presets(), None).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["shared"]);
    }

    #[test]
    fn ownerless_private_items_are_hidden() {
        let orphan = Preset { name: "orphan", owner: None, public: false };
        assert!(!is_visible_to(&orphan, Some("bbb")));
    }
}
