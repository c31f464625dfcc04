//! CLI commands for blockport

pub mod branches;
pub mod copy;
pub mod dispatch;
pub mod export;
pub mod outline;
pub mod roots;
pub mod tags;
pub mod write;
