//! Core type definitions used across the TaskHive workspace.

pub mod id;

pub use id::{DeviceId, UserId};
