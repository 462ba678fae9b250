// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

/// Errors that stop the harness before the activity runs.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("Failed to parse INPUT_JSON: {0}")]
    Request(#[from] serde_json::Error),

    #[error("Unknown activity '{name}', registered: {registered}")]
    UnknownActivity { name: String, registered: String },
}

pub type Result<T> = std::result::Result<T, HarnessError>;
