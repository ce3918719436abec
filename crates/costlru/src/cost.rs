//! Cost providers
//!
//! A cost provider weighs a value once, when it is inserted. The cache keeps
//! the result on the entry, so providers must be deterministic for the
//! running cost total to stay exact.

/// Computes the non-negative cost of a cached value
pub trait CostProvider<V>: Send + Sync {
    /// Cost of `value`
    fn cost(&self, value: &V) -> usize;
}

impl<V, F> CostProvider<V> for F
where
    F: Fn(&V) -> usize + Send + Sync,
{
    fn cost(&self, value: &V) -> usize {
        self(value)
    }
}

/// Size of the value itself, without anything it points to
///
/// This is the default provider. For heap-owning values such as `Vec<u8>`
/// it only counts the inline part, so pass a closure for real byte sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShallowSize;

impl<V> CostProvider<V> for ShallowSize {
    fn cost(&self, value: &V) -> usize {
        std::mem::size_of_val(value)
    }
}

/// Every value costs 1
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCost;

impl<V> CostProvider<V> for UnitCost {
    fn cost(&self, _value: &V) -> usize {
        1
    }
}
