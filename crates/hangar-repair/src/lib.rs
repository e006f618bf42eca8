//! # Hangar Repair
//!
//! Classification and grouping engine for vehicle model repair.
//!
//! The pipeline takes a freshly imported vehicle export sitting in a work
//! collection and walks it through:
//! - **Classification**: partition objects into keep and discard groups by
//!   object-name and texture-key substring rules ([`classify`]).
//! - **Interactive edits**: move, reorder, and merge groups between the keep
//!   and discard lists ([`store::RepairSession`]).
//! - **Finalize**: renumber keep groups into the canonical naming scheme and
//!   archive or delete the discards ([`finalize`]).
//! - **Material synthesis**: one material per surviving group, wired to the
//!   group's representative base-color texture ([`material`]).
//!
//! All scene access goes through [`hangar_scene::SceneRepository`]; nothing
//! here touches a host application directly.

use thiserror::Error;

use hangar_scene::SceneError;

pub mod classify;
pub mod finalize;
pub mod material;
pub mod store;
pub mod tag;
pub mod texture;

pub use classify::{classify, specify_body, ClassifyOptions, ClassifyReport, SpecifyOutcome};
pub use finalize::{finalize, DiscardMode, FinalizeReport};
pub use material::{analyze_materials, assign_materials, AssignReport, MaterialPlan};
pub use store::{GroupList, ListKind, MoveDir, RepairSession, Vehicle};
pub use tag::{canonical_material_name, DiscardTag, KeepTag};
pub use texture::{resolve_base_color, resolve_key, texture_key};

/// Repair errors
///
/// Precondition failures cancel the operation before any mutation; soft
/// outcomes (nothing to merge, empty lists) are `Ok` values, not errors.
#[derive(Error, Debug)]
pub enum RepairError {
    #[error("Work collection not found: {0}")]
    WorkCollectionMissing(String),

    #[error("No item selected")]
    NoSelection,

    #[error("Already at the top/bottom of the list")]
    AtBoundary,

    #[error("No active object specified")]
    NoActiveObject,

    #[error("Object has no resolvable texture: {0}")]
    NoTexture(String),

    #[error("Material plan is empty, analyze materials first")]
    EmptyPlan,

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for repair operations
pub type RepairResult<T> = Result<T, RepairError>;
