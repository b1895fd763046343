use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    pub struct BondId;
}

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

index_id!(
    /// Sequential atom identifier, assigned in insertion (file) order.
    AtomId,
    "a"
);
index_id!(
    /// Identifier of a ring found by the analyzer.
    RingId,
    "ring"
);
index_id!(
    /// Identifier of a classified functional group.
    GroupId,
    "group"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_ids_order_by_index_and_display_with_prefix() {
        let a = AtomId::from(3);
        let b = AtomId::from(10);
        assert!(a < b);
        assert_eq!(a.index(), 3);
        assert_eq!(a.to_string(), "a3");
        assert_eq!(RingId::from(0).to_string(), "ring0");
        assert_eq!(GroupId::from(2).to_string(), "group2");
    }
}
