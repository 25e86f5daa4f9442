//! # Promptloom Core
//!
//! Domain types, configuration, and error definitions for the promptloom
//! prompt-assembly pipeline. This crate has **zero framework dependencies** —
//! it defines the value objects that the assembly and history crates
//! operate on.
//!
//! ## Design Philosophy
//!
//! Everything here is a plain value object or a narrow capability trait.
//! The pipeline itself lives in `promptloom-assembly` and
//! `promptloom-history`; external collaborators (character storage, tracker
//! engine, ranking service, LLM transport) stay behind the boundary types
//! defined in this crate.

pub mod character;
pub mod config;
pub mod error;
pub mod message;
pub mod persona;
pub mod tracker;

// Re-export key types at crate root for ergonomics
pub use character::Character;
pub use config::{AssemblyConfig, ContextStage, HistoryConfig};
pub use error::{AssemblyError, Error, HistoryError, Result};
pub use message::{HistoryEntry, HistoryRole, Message, MessageEdit, Role};
pub use persona::Persona;
pub use tracker::{NoTrackers, TrackerSnapshot, TrackerSource};
