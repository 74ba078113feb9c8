//! Luma generation nodes.
//!
//! Each node is a typed async function taking a [`NodeContext`] and its
//! parameters. [`NodeRequest`] and [`dispatch`] expose the same nodes to
//! JSON callers such as the `luma-nodes` binary.

pub mod config;
pub mod context;
pub mod error;
pub mod image;
pub mod references;
pub mod request;
pub mod upload;
pub mod video;

pub use config::Settings;
pub use context::NodeContext;
pub use error::{NodeError, NodeResult};
pub use request::{dispatch, NodeRequest};
