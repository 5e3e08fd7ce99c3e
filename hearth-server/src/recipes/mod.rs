//! The recipe API: storage, business rules and HTTP routes.

pub mod mapping;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use crate::database::Migrations;

pub const MIGRATIONS: Migrations = &[
    include_str!("migrations/01-initial.sql"),
    include_str!("migrations/02-instruction-steps.sql"),
];
