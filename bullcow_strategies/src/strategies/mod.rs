//! Some strategies for use with `bullcow_rs`.
//!
//! Each strategy consists of a single struct, and everything you need to
//! configure the strategy should exist as a method.

mod exclusion;
pub use exclusion::Exclusion;

mod consistent;
pub use consistent::Consistent;
