use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{CandidateSite, ExistingAmenity, NetworkEdge, NetworkNode, ResidentialBuilding};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A self-contained fixture: a pedestrian network, its residents and
/// amenities, and the engine configuration to run against it.
///
/// This is the JSON shape used by tests, the demonstration CLI and
/// benchmarks. A production deployment would instead assemble these
/// same domain types from an OSM/GTFS ingest pipeline; that pipeline is
/// out of scope here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub residential: Vec<ResidentialBuilding>,
    pub candidates: Vec<CandidateSite>,
    pub existing_amenities: Vec<ExistingAmenity>,
    pub config: EngineConfig,
}

impl Dataset {
    /// Reads and parses a dataset from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("failed to read dataset {}: {e}", path.display()))
        })?;
        Self::load_from_str(&text)
    }

    /// Parses a dataset from a JSON string, then validates its
    /// configuration. Does not validate that residents/candidates/
    /// amenities actually lie in the graph's largest component — that
    /// is the fabric's job at construction time.
    pub fn load_from_str(text: &str) -> EngineResult<Self> {
        let dataset: Dataset = serde_json::from_str(text)
            .map_err(|e| EngineError::Configuration(format!("malformed dataset: {e}")))?;
        dataset.config.validate()?;
        Ok(dataset)
    }
}
