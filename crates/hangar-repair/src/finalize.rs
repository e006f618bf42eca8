//! Finalize
//!
//! The commit pass: recompute canonical keep-group names (bare base for a
//! lone family member, `_1.._N` in list order otherwise), rename the list
//! entries and their backing sub-collections, then archive or delete every
//! discard-list group. Renumbering never changes group contents.

use indexmap::IndexMap;
use log::info;

use hangar_scene::SceneRepository;

use crate::store::RepairSession;
use crate::tag::KeepTag;
use crate::{RepairError, RepairResult};

/// What happens to discard-list groups on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscardMode {
    /// Move member objects into the vehicle's archive collection.
    #[default]
    Archive,
    /// Permanently delete member objects.
    Delete,
}

/// Summary of a finalize pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Keep groups whose name changed during renumbering.
    pub renamed: usize,
    /// Objects archived or deleted.
    pub discarded_objects: usize,
    pub mode: DiscardMode,
}

/// Renumber and commit the session's lists.
///
/// Returns `None` when both lists are empty (nothing to do). On success the
/// session's lists are reset; the committed state lives entirely in the
/// scene's naming and grouping.
pub fn finalize<S: SceneRepository>(
    scene: &mut S,
    session: &mut RepairSession,
    mode: DiscardMode,
) -> RepairResult<Option<FinalizeReport>> {
    let vehicle = session.vehicle();
    let work = vehicle.work_collection();
    if !scene.has_collection(work) {
        return Err(RepairError::WorkCollectionMissing(work.to_owned()));
    }

    if session.keep.is_empty() && session.discard.is_empty() {
        info!("lists are empty, nothing to finalize");
        return Ok(None);
    }

    let renamed = renumber_keep_groups(scene, session)?;

    let discard_names = session.discard.entries().to_vec();
    let mut discarded_objects = 0;

    match mode {
        DiscardMode::Archive => {
            let archive = vehicle.archive_collection();
            if !scene.has_collection(archive) {
                scene.create_collection(archive, None)?;
            }
            let children = scene.child_collections(work);
            for group in &discard_names {
                if !scene.has_collection(group) || !children.contains(group) {
                    continue;
                }
                for object in scene.collection_objects(group) {
                    scene.move_object(&object, archive)?;
                    discarded_objects += 1;
                }
                scene.remove_collection(group)?;
            }
            info!("moved {discarded_objects} objects to '{archive}'");
        }
        DiscardMode::Delete => {
            for group in &discard_names {
                if !scene.has_collection(group) {
                    continue;
                }
                for object in scene.collection_objects(group) {
                    scene.remove_object(&object)?;
                    discarded_objects += 1;
                }
                scene.remove_collection(group)?;
            }
            info!("deleted {discarded_objects} objects");
        }
    }

    session.clear_lists();
    Ok(Some(FinalizeReport {
        renamed,
        discarded_objects,
        mode,
    }))
}

/// Rename keep entries to the canonical numbered scheme, in original list
/// order per base family. Entries outside the bracketed-tag grammar are left
/// alone.
fn renumber_keep_groups<S: SceneRepository>(
    scene: &mut S,
    session: &mut RepairSession,
) -> RepairResult<usize> {
    let mut families: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (index, name) in session.keep.entries().iter().enumerate() {
        if let Some(tag) = KeepTag::parse(name) {
            families.entry(tag.base).or_default().push(index);
        }
    }

    let mut renamed = 0;
    for (base, indices) in families {
        let multi = indices.len() > 1;
        for (position, index) in indices.into_iter().enumerate() {
            let old = session.keep.entries()[index].clone();
            let texture_key = KeepTag::parse(&old)
                .expect("entry parsed during family collection")
                .texture_key;

            let mut tag = KeepTag::new(&base);
            if multi {
                tag = tag.with_suffix((position + 1) as u32);
            }
            if let Some(key) = texture_key {
                tag = tag.with_texture_key(key);
            }

            let new = tag.to_string();
            if new != old {
                if scene.has_collection(&old) {
                    scene.rename_collection(&old, &new)?;
                }
                session.keep.set_entry(index, new);
                renamed += 1;
            }
        }
    }
    Ok(renamed)
}
