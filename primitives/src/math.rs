//! Fixed-point helpers shared by the vault pallets.

use crate::Balance;
use sp_arithmetic::{Rounding, helpers_128bit::multiply_by_rational_with_rounding};

/// `a * b / c` rounded toward zero, computed without intermediate overflow.
///
/// `None` when `c` is zero or the result does not fit in a `Balance`.
pub fn mul_div_floor(a: Balance, b: Balance, c: Balance) -> Option<Balance> {
  multiply_by_rational_with_rounding(a, b, c, Rounding::Down)
}
