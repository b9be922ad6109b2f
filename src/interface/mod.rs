//! Interface layer - what the UI shell binds to

pub mod metrics;
pub mod view;

pub use view::ScreenView;
