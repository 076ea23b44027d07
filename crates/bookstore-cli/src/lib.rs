//! # Bookstore CLI
//!
//! Administrative helpers for the bookstore database: creating admin
//! accounts, which the HTTP API never does, and seeding a demo catalogue.

pub mod admin;
pub mod seeder;
