use std::fmt;

use num_bigint::BigUint;

/// Arbitrary-width constant value used in process bodies
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumericConstant {
	pub value: BigUint,
	pub width: u64,
}

impl NumericConstant {
	pub fn new(value: BigUint, width: u64) -> Self {
		Self { value, width }
	}

	pub fn zero(width: u64) -> Self {
		Self::new(BigUint::from(0u32), width)
	}

	pub fn one(width: u64) -> Self {
		Self::new(BigUint::from(1u32), width)
	}

	/// Single-bit constant, the usual shape of a predicate
	pub fn new_bool(value: bool) -> Self {
		Self::new(BigUint::from(value as u32), 1)
	}

	pub fn from_u64(value: u64, width: u64) -> Self {
		Self::new(BigUint::from(value), width)
	}
}

impl fmt::Display for NumericConstant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}'d{}", self.width, self.value)
	}
}
