// crates/pcg_runtime/src/scalar.rs

//! RuntimeScalar - sealed scalar abstraction
//!
//! The single interface for compile-time precision selection. Every solver
//! kernel is written once against `S: RuntimeScalar` and monomorphised for
//! `f32` and `f64`.
//!
//! # Rules
//!
//! 1. **Sealed**: only `f32` and `f64` implement it (via `private::Sealed`)
//! 2. **Zero cost**: `#[inline]` helpers, no dynamic dispatch
//! 3. **Logging**: values are widened with `to_f64_lossy` before formatting
//!
//! ```rust
//! use pcg_runtime::RuntimeScalar;
//!
//! fn relative<S: RuntimeScalar>(residual_sq: S, rhs_sq: S) -> S {
//!     (residual_sq / rhs_sq).sqrt()
//! }
//!
//! assert_eq!(relative(4.0f64, 16.0), 0.5);
//! ```

use std::fmt::{Debug, Display};
use std::iter::Sum;

use bytemuck::Pod;
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};

mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Runtime scalar type (sealed, f32/f64 only)
///
/// Used as the generic bound `<S: RuntimeScalar>` by every vector kernel and
/// both conjugate gradient drivers. Not object safe by intent: never use
/// `&dyn RuntimeScalar`.
pub trait RuntimeScalar:
    private::Sealed
    + Pod
    + Float
    + FromPrimitive
    + ToPrimitive
    + NumAssign
    + Debug
    + Display
    + Send
    + Sync
    + Sum
    + Default
    + 'static
{
    /// Zero
    const ZERO: Self;
    /// One
    const ONE: Self;
    /// Machine epsilon
    const EPSILON: Self;
    /// Smallest positive normal value ("machine-min")
    const MIN_POSITIVE: Self;

    /// Divides, returning `fallback` when `|rhs| < MIN_POSITIVE`.
    #[inline]
    fn safe_div(self, rhs: Self, fallback: Self) -> Self {
        if rhs.abs() < Self::MIN_POSITIVE {
            fallback
        } else {
            self / rhs
        }
    }

    /// Widens to `f64` for logging; non-representable values map to NaN.
    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    /// Checks that every value of the slice is finite.
    ///
    /// Returns the first offending index and value.
    fn validate_slice(data: &[Self]) -> Result<(), (usize, Self)> {
        for (i, &v) in data.iter().enumerate() {
            if !v.is_finite() {
                return Err((i, v));
            }
        }
        Ok(())
    }
}

// =============================================================================
// f32
// =============================================================================

impl RuntimeScalar for f32 {
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
    const EPSILON: f32 = f32::EPSILON;
    const MIN_POSITIVE: f32 = f32::MIN_POSITIVE;
}

// =============================================================================
// f64
// =============================================================================

impl RuntimeScalar for f64 {
    const ZERO: f64 = 0.0;
    const ONE: f64 = 1.0;
    const EPSILON: f64 = f64::EPSILON;
    const MIN_POSITIVE: f64 = f64::MIN_POSITIVE;
}
