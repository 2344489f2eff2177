//! Pre-validation normalization of a ballot definition.
//!
//! Two adjustments run before the validator sees the data: the
//! authored `max_chars` of a contest is auto-copied onto the
//! `max_sels` of every write-in sub-group its options reference, and
//! an externally computed rotation result is recorded into the option
//! areas that were authored unfilled.

use crate::ballot::model::BallotDef;
use crate::foundation::core::opt_index;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally computed rotation result: which option each
/// rotation-eligible option area displays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotationPlan {
    /// Individual area assignments.
    pub fills: Vec<RotationFill>,
}

/// One rotation assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RotationFill {
    /// Page owning the option area.
    pub page_i: usize,
    /// Option area within the page.
    pub option_area_i: usize,
    /// Option the area displays.
    pub option_i: usize,
}

/// Errors recording a rotation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    /// The fill names a page or area that does not exist.
    UnknownArea {
        /// Page index named by the fill.
        page_i: usize,
        /// Area index named by the fill.
        option_area_i: usize,
    },
    /// The fill targets an area that is already bound to an option.
    AlreadyFilled {
        /// Page index named by the fill.
        page_i: usize,
        /// Area index named by the fill.
        option_area_i: usize,
    },
    /// The assigned option is outside the area's group.
    BadOption {
        /// Page index named by the fill.
        page_i: usize,
        /// Area index named by the fill.
        option_area_i: usize,
        /// Offending option index.
        option_i: usize,
    },
}

impl fmt::Display for RotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArea {
                page_i,
                option_area_i,
            } => write!(f, "no option area {option_area_i} on page {page_i}"),
            Self::AlreadyFilled {
                page_i,
                option_area_i,
            } => write!(
                f,
                "option area {option_area_i} on page {page_i} is already filled"
            ),
            Self::BadOption {
                page_i,
                option_area_i,
                option_i,
            } => write!(
                f,
                "option {option_i} is not valid for option area {option_area_i} on page {page_i}"
            ),
        }
    }
}

impl std::error::Error for RotationError {}

/// Copy each contest's `max_chars` onto the `max_sels` of every
/// write-in sub-group referenced by its options.
///
/// The copy intentionally overwrites the authored value; the validator
/// afterwards asserts the equality, which catches two contests with
/// different `max_chars` sharing one sub-group.
pub fn propagate_writein_capacity(def: &mut BallotDef) {
    let copies: Vec<(usize, u32)> = def
        .model
        .groups
        .iter()
        .flat_map(|group| {
            group.options.iter().filter_map(|option| {
                let sub = opt_index(option.writein_group_i)?;
                Some((sub, group.max_chars))
            })
        })
        .collect();
    for (sub, max_chars) in copies {
        if let Some(group) = def.model.groups.get_mut(sub) {
            group.max_sels = max_chars;
        }
    }
}

/// Record a rotation result into the definition's unfilled option
/// areas. Each area may be assigned at most once.
pub fn apply_rotation(def: &mut BallotDef, plan: &RotationPlan) -> Result<(), RotationError> {
    for fill in &plan.fills {
        let area = def
            .model
            .pages
            .get(fill.page_i)
            .and_then(|p| p.option_areas.get(fill.option_area_i))
            .copied()
            .ok_or(RotationError::UnknownArea {
                page_i: fill.page_i,
                option_area_i: fill.option_area_i,
            })?;
        if area.option_i != -1 {
            return Err(RotationError::AlreadyFilled {
                page_i: fill.page_i,
                option_area_i: fill.option_area_i,
            });
        }
        let options = opt_index(area.group_i)
            .and_then(|g| def.model.groups.get(g))
            .map_or(0, |g| g.options.len());
        if fill.option_i >= options {
            return Err(RotationError::BadOption {
                page_i: fill.page_i,
                option_area_i: fill.option_area_i,
                option_i: fill.option_i,
            });
        }
        if let Some(area) = def
            .model
            .pages
            .get_mut(fill.page_i)
            .and_then(|p| p.option_areas.get_mut(fill.option_area_i))
        {
            area.option_i = fill.option_i as i32;
        }
    }
    Ok(())
}
