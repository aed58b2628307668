pub mod math;

use num::Num;
use serde::{Deserialize, Serialize};

/// ZeroSpVec is a sparse vector whose implicit element is zero.
///
/// It keeps `inds` (dimension index of each stored element) and `vals`
/// side by side. `inds` is always strictly ascending, so lookups are a
/// binary search and pairwise operations are a linear merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroSpVec<N>
where
    N: Num + Copy,
{
    inds: Vec<u32>,
    vals: Vec<N>,
    /// logical dimension
    len: usize,
}

impl<N> ZeroSpVec<N>
where
    N: Num + Copy,
{
    /// All-zero vector of dimension `len`.
    #[inline]
    pub fn new(len: usize) -> Self {
        Self {
            inds: Vec::new(),
            vals: Vec::new(),
            len,
        }
    }

    #[inline]
    pub fn with_capacity(len: usize, nnz: usize) -> Self {
        Self {
            inds: Vec::with_capacity(nnz),
            vals: Vec::with_capacity(nnz),
            len,
        }
    }

    /// Build from `(index, value)` pairs in any order.
    ///
    /// Zeros and out-of-range indices are dropped; repeated indices are summed.
    pub fn from_pairs(len: usize, mut pairs: Vec<(u32, N)>) -> Self {
        pairs.retain(|(idx, _)| (*idx as usize) < len);
        pairs.sort_unstable_by_key(|(idx, _)| *idx);
        let mut vec = Self::with_capacity(len, pairs.len());
        for (idx, val) in pairs {
            match (vec.inds.last(), vec.vals.last_mut()) {
                (Some(&last), Some(slot)) if last == idx => *slot = *slot + val,
                _ => {
                    vec.inds.push(idx);
                    vec.vals.push(val);
                }
            }
        }
        vec.drop_zeros();
        vec
    }

    /// Dense slice to sparse.
    pub fn from_dense(dense: &[N]) -> Self {
        let mut vec = Self::new(dense.len());
        for (idx, &val) in dense.iter().enumerate() {
            if val != N::zero() {
                vec.inds.push(idx as u32);
                vec.vals.push(val);
            }
        }
        vec
    }

    fn drop_zeros(&mut self) {
        let zero = N::zero();
        let mut keep = 0;
        for i in 0..self.inds.len() {
            if self.vals[i] != zero {
                self.inds[keep] = self.inds[i];
                self.vals[keep] = self.vals[i];
                keep += 1;
            }
        }
        self.inds.truncate(keep);
        self.vals.truncate(keep);
    }

    /// logical dimension
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    /// Value at `index`; zero when not stored or out of range.
    #[inline]
    pub fn get(&self, index: usize) -> N {
        if index >= self.len {
            return N::zero();
        }
        match self.inds.binary_search(&(index as u32)) {
            Ok(pos) => self.vals[pos],
            Err(_) => N::zero(),
        }
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.inds
    }

    #[inline]
    pub fn values(&self) -> &[N] {
        &self.vals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_sorts_merges_and_drops_zeros() {
        let vec = ZeroSpVec::from_pairs(5, vec![(3, 1.0f32), (1, 2.0), (3, 0.5), (4, 0.0), (9, 7.0)]);
        assert_eq!(vec.indices(), &[1, 3]);
        assert_eq!(vec.values(), &[2.0, 1.5]);
        assert_eq!(vec.len(), 5);
        assert_eq!(vec.get(3), 1.5);
    }

    #[test]
    fn get_returns_zero_outside_storage() {
        let vec = ZeroSpVec::from_dense(&[0.0f64, 3.0, 0.0]);
        assert_eq!(vec.get(0), 0.0);
        assert_eq!(vec.get(1), 3.0);
        assert_eq!(vec.get(100), 0.0);
        assert_eq!(vec.nnz(), 1);
    }

    #[test]
    fn empty_vector_stores_nothing() {
        let vec: ZeroSpVec<f32> = ZeroSpVec::new(10);
        assert_eq!(vec.nnz(), 0);
        assert!(vec.indices().is_empty());
    }
}
