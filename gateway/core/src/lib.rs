// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! GA4GH WES facade for AWS HealthOmics
//!
//! Translates Workflow Execution Service calls into HealthOmics workflow API
//! calls and shapes the results (and failures) back into the WES contract.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Wires the domain, application, infrastructure and presentation layers

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
