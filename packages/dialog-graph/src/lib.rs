//! Branching dialogue for Cosmic Cities.
//!
//! Dialogue scripts are declarative TOML or JSON documents describing a graph of
//! nodes. [`DialogGraph`] loads one script at a time and walks it with a single
//! cursor; [`input`] maps player keys onto that cursor.

pub mod error;
pub mod graph;
pub mod input;
pub mod loader;
pub mod node;

pub use error::DialogError;
pub use graph::DialogGraph;
pub use loader::{DialogFormat, DialogSource, InlineDialog};
pub use node::{DialogChoice, DialogNode, NodeId};
