//! Decoder for Path of Building export codes.
//!
//! [`core_api::Engine`] turns an export code (or paste URL, or the raw XML)
//! into a [`core_api::Session`] that maps the build's sections on demand. The
//! lower-level pieces are public as well: [`transport`] for the code itself,
//! [`affix`] and [`item`] for item text, [`passive_tree`] for tree links.

pub mod affix;
pub mod config;
pub mod core_api;
pub mod document;
pub mod item;
pub mod keystones;
pub mod monster;
pub mod passive_tree;
pub mod rarity;
pub mod reader;
pub mod slot;
pub mod stats;
pub mod transport;

pub use core_api::{Error, ErrorCode, Result};
