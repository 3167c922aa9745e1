//! Obfuscates declared resource identifiers in UI application projects.
//!
//! The engine discovers resource symbols in markup, renames them to
//! randomized collision-free names per category, and keeps every reference
//! consistent, including generated accessor fields and classes whose names
//! derive from the renamed symbols. Work proceeds in ordered phases with
//! host-visible progress and cancellation.

pub mod accessor;
pub mod collector;
pub mod config;
pub mod generator;
pub mod markup;
pub mod orchestrator;
pub mod progress;
pub mod project;
pub mod propagate;
pub mod resources;
