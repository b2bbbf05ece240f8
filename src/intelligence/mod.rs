// ABOUTME: Intelligence module for derived engagement analytics
// ABOUTME: Exposes the growth analyzer and its computed statistics snapshot
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Derived analytics over stored posts

/// Period-over-period growth statistics
pub mod growth;

pub use growth::{BestPost, GrowthAnalyzer, GrowthStats, PeriodDays};
