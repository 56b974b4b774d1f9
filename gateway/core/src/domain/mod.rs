// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Request-scoped value objects and pure translation rules. The only I/O here
//! is reading the configuration file at startup.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Runs, tasks, pagination, error taxonomy, storage scopes and configuration

pub mod backend;
pub mod config;
pub mod error;
pub mod pagination;
pub mod policy;
pub mod run;
pub mod scope;
pub mod service_info;
