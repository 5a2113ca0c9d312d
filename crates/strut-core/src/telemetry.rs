// SPDX-License-Identifier: Apache-2.0
//! Telemetry sink boundary.
//!
//! The engine performs no I/O; hosts that want observability install a sink
//! and receive counter events. Every hook has an empty default, so the null
//! sink costs nothing. Sinks must not feed anything back into compilation —
//! events are strictly one-way.

use crate::error::CacheKind;
use crate::ident::StructId;

/// Host-provided event receiver.
pub trait TelemetrySink {
    /// A work item was dispatched and its stage rebuilt.
    fn work_processed(&self, struct_id: StructId, work_type_id: u16) {
        let _ = (struct_id, work_type_id);
    }

    /// A stage finished with spatial inserts refused for capacity.
    /// `refused_total` is the index's running refusal counter.
    fn spatial_refused(&self, cache: CacheKind, refused_total: u32) {
        let _ = (cache, refused_total);
    }
}

/// Sink that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTelemetrySink;

impl TelemetrySink for NullTelemetrySink {}
