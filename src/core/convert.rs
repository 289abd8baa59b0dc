use anyhow::Result;

/// Trait for converting from an index
pub trait FromIndex: Sized {
    /// Convert from an index to Self
    fn from_index(idx: usize) -> Result<Self>;
}

/// Trait for converting to an index
pub trait ToIndex {
    /// Convert self to an index
    fn to_index(&self) -> Result<usize>;
}

/// Implements `FromIndex`/`ToIndex` for a fieldless enum deriving
/// `FromPrimitive`/`ToPrimitive`.
macro_rules! impl_index_conversions {
    ($ty:ty, $what:literal) => {
        impl $crate::core::convert::FromIndex for $ty {
            fn from_index(idx: usize) -> ::anyhow::Result<Self> {
                ::num_traits::FromPrimitive::from_usize(idx)
                    .ok_or_else(|| ::anyhow::anyhow!("Invalid {} index: {}", $what, idx))
            }
        }

        impl $crate::core::convert::ToIndex for $ty {
            fn to_index(&self) -> ::anyhow::Result<usize> {
                ::num_traits::ToPrimitive::to_usize(self)
                    .ok_or_else(|| ::anyhow::anyhow!("Invalid {} value", $what))
            }
        }
    };
}

pub(crate) use impl_index_conversions;
