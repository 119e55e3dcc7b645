//! Routing of pipeline results to the host's outbound relationships.
//!
//! Every source record is sent to [`Relationship::Original`] unchanged, then
//! either the derived record goes to [`Relationship::Success`] or the source
//! record goes to [`Relationship::Failure`]. Nothing is emitted for a record
//! twice on the same relationship.

use crate::Result;
use crate::core::engine::ExtractionOutcome;
use crate::core::pipeline::{ConversionResult, MetadataResult};
use crate::core::record::FlowRecord;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Original,
    Success,
    Failure,
}

impl Relationship {
    pub const ALL: [Relationship; 3] = [Relationship::Original, Relationship::Success, Relationship::Failure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Original => "original",
            Relationship::Success => "success",
            Relationship::Failure => "failure",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-side sink for routed records.
pub trait ResultRouter {
    fn transfer(&mut self, relationship: Relationship, record: FlowRecord) -> Result<()>;
}

fn route<R: ResultRouter + ?Sized>(
    router: &mut R,
    source: &FlowRecord,
    outcome: &ExtractionOutcome,
    derived: Option<FlowRecord>,
) -> Result<Relationship> {
    router.transfer(Relationship::Original, source.clone())?;

    match (outcome, derived) {
        (ExtractionOutcome::Success(_), Some(record)) => {
            router.transfer(Relationship::Success, record)?;
            Ok(Relationship::Success)
        }
        (outcome, _) => {
            if let Some(reason) = outcome.failure() {
                tracing::debug!(uuid = %source.id(), reason = reason.kind(), "Routing to failure");
            }
            router.transfer(Relationship::Failure, source.clone())?;
            Ok(Relationship::Failure)
        }
    }
}

/// Route a conversion result. Returns the relationship the outcome went to.
pub fn route_conversion<R: ResultRouter + ?Sized>(
    router: &mut R,
    source: &FlowRecord,
    result: ConversionResult,
) -> Result<Relationship> {
    route(router, source, &result.outcome, result.artifact)
}

/// Route a metadata result. Returns the relationship the outcome went to.
pub fn route_metadata<R: ResultRouter + ?Sized>(
    router: &mut R,
    source: &FlowRecord,
    result: MetadataResult,
) -> Result<Relationship> {
    route(router, source, &result.outcome, result.companion)
}

/// Router that keeps every transfer in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingRouter {
    transfers: Vec<(Relationship, FlowRecord)>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> &[(Relationship, FlowRecord)] {
        &self.transfers
    }

    pub fn records(&self, relationship: Relationship) -> Vec<&FlowRecord> {
        self.transfers
            .iter()
            .filter(|(rel, _)| *rel == relationship)
            .map(|(_, record)| record)
            .collect()
    }

    pub fn count(&self, relationship: Relationship) -> usize {
        self.transfers.iter().filter(|(rel, _)| *rel == relationship).count()
    }

    pub fn into_transfers(self) -> Vec<(Relationship, FlowRecord)> {
        self.transfers
    }
}

impl ResultRouter for RecordingRouter {
    fn transfer(&mut self, relationship: Relationship, record: FlowRecord) -> Result<()> {
        self.transfers.push((relationship, record));
        Ok(())
    }
}
