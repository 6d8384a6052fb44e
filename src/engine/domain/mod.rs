//! Domain Objects
//!
//! Teams, streets, products and the project itself. Every entity carries a
//! name plus its own target overrides per metric kind.

pub mod base;
pub mod product;
pub mod project;
pub mod requirement;
pub mod street;
pub mod team;

pub use base::{DomainObject, Subject, TargetOverride, Targets};
pub use product::{Product, ProductRef};
pub use project::{Project, Resource};
pub use requirement::{Requirement, Requirements};
pub use street::Street;
pub use team::Team;
