// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Name-to-activity lookup for hosts that pick activities at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use schedproc_sdk::CodeActivity;

use crate::run_process::RunProcessActivity;

/// Registry key of [`RunProcessActivity`].
pub const RUN_PROCESS: &str = "run-process";

#[derive(Default)]
pub struct ActivityRegistry {
    activities: HashMap<String, Arc<dyn CodeActivity>>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every activity shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(RUN_PROCESS, Arc::new(RunProcessActivity::new()));
        registry
    }

    /// Register `activity` under `name`, returning the one it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        activity: Arc<dyn CodeActivity>,
    ) -> Option<Arc<dyn CodeActivity>> {
        self.activities.insert(name.into(), activity)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CodeActivity>> {
        self.activities.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.activities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ActivityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRegistry")
            .field("activities", &self.names())
            .finish()
    }
}
