//! Entity models.
//!
//! Two layers live here:
//!
//! - [`spdx22`] and [`spdx30`] mirror each SPDX version's JSON shape,
//!   including required fields and enum spellings.
//! - [`entities`] is the version-neutral model the comparator works on.
//!   Converters in [`crate::convert`] move data between the layers.
//!
//! Enumerations that differ in spelling between versions are mapped through
//! explicit tables in [`entities`] and read/written by the adapters in
//! `wire`.

mod document;
mod entities;
mod identifiers;
pub mod spdx22;
pub mod spdx30;
mod wire;

pub use document::*;
pub use entities::*;
pub use identifiers::*;
