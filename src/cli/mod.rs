// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI support for the solidgraph binary

pub mod reporter;

pub use reporter::{RenderSummary, Reporter};
