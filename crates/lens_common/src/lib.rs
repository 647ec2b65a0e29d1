//! Shared foundational types used across the sketch code-intelligence layer.
//!
//! This crate provides content hashing for cache keys, the declaration-skeleton
//! hash used to memoize synthetic-source decisions, and common result types.

#![warn(missing_docs)]

pub mod hash;
pub mod result;
pub mod skeleton;

pub use hash::{ContentHash, HashBuilder};
pub use result::{InternalError, LensResult};
pub use skeleton::{declaration_skeleton, DeclarationSkeleton};
