use crate::ballot::model::BallotDef;
use crate::foundation::error::{ScrutinError, ScrutinResult};
use crate::normalize::pass::{RotationPlan, apply_rotation, propagate_writein_capacity};
use crate::schema::validate::{Violations, validate_ballot};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Validated ballot-definition handle.
///
/// This is the only way runtime code receives a [`BallotDef`]: the
/// constructor normalizes the authored data, then runs the exhaustive
/// validator, so every index reachable from a `Ballot` is proven in
/// range. The handle is immutable and safely shared read-only across
/// any number of concurrent terminal sessions.
#[derive(Debug, Clone)]
pub struct Ballot {
    def: BallotDef,
}

impl Ballot {
    /// Normalize and validate an in-memory definition.
    #[tracing::instrument(skip(def))]
    pub fn new(mut def: BallotDef) -> Result<Self, Violations> {
        propagate_writein_capacity(&mut def);
        validate_ballot(&def)?;
        Ok(Self { def })
    }

    /// Normalize, record a rotation result, then validate.
    pub fn with_rotation(mut def: BallotDef, plan: &RotationPlan) -> ScrutinResult<Self> {
        propagate_writein_capacity(&mut def);
        apply_rotation(&mut def, plan).map_err(|e| ScrutinError::validation(e.to_string()))?;
        validate_ballot(&def)
            .map_err(|e| ScrutinError::validation(format!("ballot validation failed: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a ballot definition from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrutinResult<Self> {
        let def: BallotDef = serde_json::from_reader(r)
            .map_err(|e| ScrutinError::validation(format!("parse ballot definition JSON: {e}")))?;
        Self::new(def)
            .map_err(|e| ScrutinError::validation(format!("ballot validation failed: {e}")))
    }

    /// Parse a ballot definition from a JSON file on disk and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> ScrutinResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrutinError::validation(format!("open ballot definition '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Idle timeout in milliseconds; `0` disables the idle timer.
    pub fn timeout_ms(&self) -> u32 {
        self.def.model.timeout_ms
    }

    /// `true` when every option area is bound to an option, i.e. any
    /// rotation result has been recorded.
    pub fn rotation_resolved(&self) -> bool {
        self.def
            .model
            .pages
            .iter()
            .all(|p| p.option_areas.iter().all(|a| a.option_i != -1))
    }

    pub(crate) fn def(&self) -> &BallotDef {
        &self.def
    }
}
