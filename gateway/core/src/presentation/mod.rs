// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`omics-wes-core`)
//!
//! HTTP surface that turns WES requests into [`RunOperations`] calls and
//! their results or failures into WES-shaped responses. No translation rules
//! live here beyond status and body shaping.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Axum router and handlers |
//! | [`error`] | `FacadeError` to status and error body |
//! | [`observe`] | Request spans and HTTP metrics |
//!
//! [`RunOperations`]: crate::application::RunOperations

pub mod api;
pub mod error;
pub mod observe;

pub use api::{app, AppState};
