// ABOUTME: Provider module organizing external social API clients
// ABOUTME: Exposes the Instagram Graph client behind an async trait seam
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! External provider clients
//!
//! Each provider is exposed behind a trait so the linking flow and sync
//! engine stay testable without network access.

/// Instagram Graph API client
pub mod instagram;

pub use instagram::{
    InstagramApi, InstagramClient, InstagramEndpoints, InstagramProfile, LongLivedToken, MediaItem,
    MEDIA_PAGE_SIZE,
};
