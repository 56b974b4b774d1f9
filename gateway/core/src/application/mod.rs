// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod run_operations;

pub use run_operations::{with_deadline, RunOperations};
