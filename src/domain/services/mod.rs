//! # Domain Services
//!
//! 複数のエンティティにまたがるビジネスルール

pub mod readiness;
