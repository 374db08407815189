use std::ops::AddAssign;

use num::Float;

use super::TermSpVec;

impl<N> TermSpVec<N>
where
    N: Float + AddAssign,
{
    /// Dot product
    /// Keys present in only one vector contribute zero, so it is enough to
    /// walk the smaller vector and probe the larger one.
    #[inline]
    pub fn dot(&self, other: &Self) -> N {
        let (small, large) = if self.nnz() <= other.nnz() {
            (self, other)
        } else {
            (other, self)
        };
        let mut result = N::zero();
        for (term, value) in small.iter() {
            result += value * large.get(term);
        }
        result
    }

    #[inline]
    pub fn norm_sq(&self) -> N {
        let mut result = N::zero();
        for (_, value) in self.iter() {
            result += value * value;
        }
        result
    }

    #[inline]
    pub fn norm(&self) -> N {
        self.norm_sq().sqrt()
    }

    /// Cosine similarity
    /// cosθ = A・B / (|A||B|)
    ///
    /// Defined as 0 when either vector has zero magnitude.
    /// Clamped to `[-1, 1]` to absorb rounding error.
    pub fn cosine(&self, other: &Self) -> N {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a.is_zero() || norm_b.is_zero() {
            return N::zero();
        }
        let score = self.dot(other) / (norm_a * norm_b);
        score.max(-N::one()).min(N::one())
    }
}
