//! Meeting provider HTTP adapter

pub mod client;

pub use client::VideoSdkClient;
