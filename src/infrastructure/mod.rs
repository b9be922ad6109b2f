//! Infrastructure layer - Adapters for the external collaborators
//!
//! - `videosdk`: room creation against the meeting provider
//! - `supabase`: appointment and doctor rows over PostgREST
//! - `meeting`: in-process meeting connection
//! - `navigation`: in-memory navigation history

pub mod http;
pub mod meeting;
pub mod navigation;
pub mod supabase;
pub mod videosdk;
