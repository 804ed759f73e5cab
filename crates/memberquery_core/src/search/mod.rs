//! Dynamic member search building blocks.
//!
//! # Responsibility
//! - Compose optional predicates into SQL filters (`predicate`).
//! - Map search conditions onto those filters (`condition`).
//! - Describe page requests and page results (`page`).

pub mod condition;
pub mod page;
pub mod predicate;
