// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Harness configuration.

use std::env;
use std::path::PathBuf;

use crate::error::{HarnessError, Result};

/// Harness configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Raw test request (required)
    pub input_json: String,
    /// Base data directory (default: ".")
    pub data_dir: PathBuf,
    /// Explicit output file, overriding `$DATA_DIR/output.json`
    pub output_file: Option<PathBuf>,
}

impl HarnessConfig {
    /// Load configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `INPUT_JSON` - Test request
    ///
    /// # Optional Environment Variables
    /// - `DATA_DIR` - Base data directory (default: ".")
    /// - `SCHEDPROC_OUTPUT_FILE` - Output file path (default: "$DATA_DIR/output.json")
    pub fn from_env() -> Result<Self> {
        let input_json = env::var("INPUT_JSON").map_err(|_| {
            HarnessError::Config("INPUT_JSON environment variable not set".to_string())
        })?;

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let output_file = env::var("SCHEDPROC_OUTPUT_FILE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            input_json,
            data_dir,
            output_file,
        })
    }

    /// Where `output.json` is written.
    pub fn output_path(&self) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("output.json"))
    }
}
