//! Instructions Module
//!
//! Turns a finished design into printable steps: ordered build levels and
//! the parts list.

pub mod parts;
pub mod resolver;

pub use parts::{PartsEntry, parts_list};
pub use resolver::{BuildLevel, BuildOrder, ViewHints, resolve_build_order};
