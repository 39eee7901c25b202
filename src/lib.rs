//! # Desmo LD hub reader
//!
//! Reads the Desmo LD hub contract's state directly from its storage slots, and encodes
//! and decodes the compact query results exchanged with it.

pub mod cli;
pub mod codec;
pub mod constants;
pub mod hub;
pub mod output;
pub mod storage;
