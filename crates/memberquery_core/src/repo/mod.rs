//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define member/team data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories refuse connections whose schema is not fully migrated.
//! - Repository APIs return semantic errors (`NotFound`, `TeamNotFound`) in
//!   addition to DB transport errors.

pub mod member_repo;
pub mod team_repo;
