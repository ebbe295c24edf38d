//! Near-Earth objects and their close approaches to Earth.
//!
//! [`data`] holds the linked dataset and its query engine; the other modules
//! read and write files and drive the command line.

pub mod cli;
pub mod data;
pub mod output;
pub mod repl;
pub mod state;
