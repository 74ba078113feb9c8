//! Domain types and validation for the Luma generation nodes.
//!
//! Everything in this crate is pure: option enums, keyframe and
//! reference builders, download-target resolution, and the polling
//! policy. Network access lives in `luma-api` and `luma-imgbb`.

pub mod error;
pub mod keyframes;
pub mod options;
pub mod output_path;
pub mod polling;
pub mod references;
