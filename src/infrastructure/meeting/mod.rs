//! Meeting connection adapters

pub mod loopback;

pub use loopback::{ConnectionCommand, LoopbackConnection, LoopbackConnector};
