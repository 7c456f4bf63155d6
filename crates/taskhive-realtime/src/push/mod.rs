//! Push token registration over the realtime connection.

pub mod registrar;

pub use registrar::PushRegistrar;
