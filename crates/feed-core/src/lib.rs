//! Core types and trait definitions for the activity feed engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It owns the entity model (actor / verb / object / target), the
//! deterministic family hash used to group related activities, the
//! composable query predicates, and the grammar-driven headline and label
//! formatting. Persistence is abstracted behind [`store::FeedStore`].

pub mod activity;
pub mod entity;
pub mod error;
pub mod filter;
pub mod grammar;
pub mod grouping;
pub mod store;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
