//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod catalog;
pub mod export;
pub mod hexdump;
pub mod modules;
pub mod read;
pub mod resolve;
pub mod write;
