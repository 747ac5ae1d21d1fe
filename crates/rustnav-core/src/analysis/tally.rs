use std::collections::BTreeMap;

use crate::protocols::game::{Decoded, PacketType};
use crate::protocols::wire::{DecodeError, ErrorKind};
use crate::{DecodeErrorSummary, PacketTypeSummary};

const MAX_ERROR_EXAMPLES: usize = 3;

#[derive(Debug, Default, Clone)]
pub(crate) struct TypeCounts {
    pub count: u64,
    pub decoded: u64,
    pub failed: u64,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ErrorCounts {
    pub count: u64,
    pub examples: Vec<String>,
}

/// Running totals over dispatched datagrams.
#[derive(Debug, Default)]
pub(crate) struct DecodeTally {
    per_type: BTreeMap<PacketType, TypeCounts>,
    per_error: BTreeMap<ErrorKind, ErrorCounts>,
    pub decoded: u64,
    pub unhandled: u64,
    pub failed: u64,
}

impl DecodeTally {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_success(&mut self, decoded: &Decoded) {
        let entry = self.per_type.entry(decoded.packet_type()).or_default();
        entry.count += 1;
        match decoded {
            Decoded::Record(_) => {
                entry.decoded += 1;
                self.decoded += 1;
            }
            Decoded::Unhandled(_) => self.unhandled += 1,
        }
    }

    /// Records a failure; `example` is only built while examples are still
    /// being collected for this kind.
    pub(crate) fn add_failure(
        &mut self,
        packet_type: PacketType,
        err: &DecodeError,
        example: impl FnOnce() -> String,
    ) {
        let entry = self.per_type.entry(packet_type).or_default();
        entry.count += 1;
        entry.failed += 1;
        self.failed += 1;

        let errors = self.per_error.entry(err.kind()).or_default();
        errors.count += 1;
        if errors.examples.len() < MAX_ERROR_EXAMPLES {
            errors.examples.push(example());
        }
    }

    pub(crate) fn type_summaries(&self) -> Vec<PacketTypeSummary> {
        self.per_type
            .iter()
            .map(|(packet_type, counts)| PacketTypeSummary {
                packet_type: *packet_type,
                ordinal: packet_type.ordinal(),
                count: counts.count,
                decoded: counts.decoded,
                failed: counts.failed,
            })
            .collect()
    }

    pub(crate) fn error_summaries(&self) -> Vec<DecodeErrorSummary> {
        self.per_error
            .iter()
            .map(|(kind, counts)| DecodeErrorSummary {
                kind: *kind,
                count: counts.count,
                examples: counts.examples.clone(),
            })
            .collect()
    }
}
