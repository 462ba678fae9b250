// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Invocation-scoped trace sink and stock tracing capabilities.

use std::fmt;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::host::{ExecutionContext, TracingService};

/// The single diagnostic channel of one invocation.
///
/// Built by the lifecycle wrapper from the host tracing capability and handed
/// to activity code through the invocation scope. A disabled sink drops every
/// record, so code running before initialization cannot reach the host.
#[derive(Clone)]
pub struct TraceSink {
    service: Option<Arc<dyn TracingService>>,
}

impl TraceSink {
    pub fn new(service: Arc<dyn TracingService>) -> Self {
        Self {
            service: Some(service),
        }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { service: None }
    }

    /// Sink over the tracing capability of `context`, disabled when the host
    /// registered none.
    pub fn from_context(context: &ExecutionContext) -> Self {
        context
            .tracing_service()
            .map(Self::new)
            .unwrap_or_else(Self::disabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// Emit one record. Use with `format_args!`.
    pub fn trace(&self, message: fmt::Arguments<'_>) {
        if let Some(service) = &self.service {
            service.trace(message);
        }
    }
}

impl fmt::Debug for TraceSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceSink")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Tracing capability that forwards records to the `tracing` crate.
#[derive(Debug, Clone, Default)]
pub struct LogTracingService {
    correlation_id: Option<Uuid>,
}

impl LogTracingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the correlation id to every emitted event.
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

impl TracingService for LogTracingService {
    fn trace(&self, message: fmt::Arguments<'_>) {
        match self.correlation_id {
            Some(correlation_id) => tracing::info!(
                target: "schedproc::trace",
                correlation_id = %correlation_id,
                "{}",
                message
            ),
            None => tracing::info!(target: "schedproc::trace", "{}", message),
        }
    }
}

/// Tracing capability that keeps every record in memory.
#[derive(Debug, Default)]
pub struct RecordingTracingService {
    records: Mutex<Vec<String>>,
}

impl RecordingTracingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records emitted so far.
    pub fn records(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// True if any record contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|r| r.contains(needle))
    }
}

impl TracingService for RecordingTracingService {
    fn trace(&self, message: fmt::Arguments<'_>) {
        // A poisoned lock only means another writer panicked mid-push.
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push(message.to_string());
    }
}

/// Fans every record out to several capabilities.
pub struct TeeTracingService {
    services: Vec<Arc<dyn TracingService>>,
}

impl TeeTracingService {
    pub fn new(services: Vec<Arc<dyn TracingService>>) -> Self {
        Self { services }
    }
}

impl TracingService for TeeTracingService {
    fn trace(&self, message: fmt::Arguments<'_>) {
        for service in &self.services {
            service.trace(message);
        }
    }
}
