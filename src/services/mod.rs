// ABOUTME: Service module organizing the operation surface consumed by the routing layer
// ABOUTME: Business logic lives here; HTTP concerns stay with the external collaborator
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Core-exposed service operations

/// Instagram linking, sync, and stats operations
pub mod instagram;

pub use instagram::{AccountStats, AccountSummary, InstagramService, SyncAccepted};
