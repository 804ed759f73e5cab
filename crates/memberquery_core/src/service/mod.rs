//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate member/team repository calls into use-case level APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod member_service;
