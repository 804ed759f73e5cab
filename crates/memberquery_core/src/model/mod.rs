//! Member/team domain model.
//!
//! # Responsibility
//! - Define the persisted entities (`Team`, `Member`) and their insert payloads.
//! - Define the flat carriers used across the repository boundary.
//!
//! # Invariants
//! - Identity is assigned by the store on insert and never reused.
//! - A member's team reference and the team's member collection never
//!   disagree; the collection is derived, not set.

pub mod dto;
pub mod member;
pub mod team;
