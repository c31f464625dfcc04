//! Blockport Core Library
//!
//! Export tree construction and rendering for block-structured outliners:
//! flat, fragmentary query results are reassembled into an ordered forest,
//! optionally narrowed to the paths reaching matched blocks, and rendered
//! as Markdown, HTML or styled HTML.

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod forest;
pub mod logging;
pub mod model;
pub mod naming;
pub mod order;
pub mod outline;
pub mod prune;
pub mod records;
pub mod render;
pub mod selection;
pub mod source;

pub use error::{BlockportError, ExitCode, Result};
pub use model::{BlockRecord, Forest, TreeNode};
