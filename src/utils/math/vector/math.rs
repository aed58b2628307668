use num::{Float, Num, NumCast};

use super::ZeroSpVec;

impl<N> ZeroSpVec<N>
where
    N: Num + Copy + Into<f64>,
{
    /// L2 norm, accumulated in f64.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.values()
            .iter()
            .map(|&v| {
                let v: f64 = v.into();
                v * v
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl<N> ZeroSpVec<N>
where
    N: Float + Into<f64>,
{
    /// Scale to unit L2 norm. A zero vector stays zero.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 {
            return;
        }
        let scale = <N as NumCast>::from(1.0 / norm).unwrap_or_else(N::one);
        for val in self.values_mut() {
            *val = *val * scale;
        }
    }
}

impl<N> ZeroSpVec<N>
where
    N: Num + Copy,
{
    #[inline]
    pub(crate) fn values_mut(&mut self) -> &mut [N] {
        &mut self.vals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_gives_unit_norm() {
        let mut v = ZeroSpVec::from_dense(&[3.0f64, 0.0, 4.0]);
        v.l2_normalize();
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!((v.get(0) - 0.6).abs() < 1e-12);

        let mut zero: ZeroSpVec<f64> = ZeroSpVec::new(3);
        zero.l2_normalize();
        assert_eq!(zero.nnz(), 0);
    }
}
