//! Group Store
//!
//! The editable result of classification: two ordered lists of group names
//! (keep and discard) per vehicle session, each with its own selection.
//! Edits either complete fully or leave both the lists and the scene
//! untouched; selection is re-clamped by every mutating operation so it is
//! never read out of bounds.

use log::info;

use hangar_scene::{SceneError, SceneRepository};

use crate::{RepairError, RepairResult};

/// Vehicle profile selecting the work and archive collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vehicle {
    Ground,
    Air,
}

impl Vehicle {
    /// Root container of this vehicle's in-progress objects.
    pub fn work_collection(self) -> &'static str {
        match self {
            Self::Ground => "Ground_Work",
            Self::Air => "Aviation_Work",
        }
    }

    /// Persistent archive that discarded objects are moved into.
    pub fn archive_collection(self) -> &'static str {
        match self {
            Self::Ground => "Hidden_Items",
            Self::Air => "Hidden_Air_Items",
        }
    }
}

/// Which of the two lists an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Keep,
    Discard,
}

/// Direction of a reorder or merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDir {
    Up,
    Down,
}

/// An ordered list of group names with a selection cursor.
#[derive(Debug, Clone, Default)]
pub struct GroupList {
    entries: Vec<String>,
    selected: Option<usize>,
}

impl GroupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group names in list order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected index, `None` when the list is empty or nothing is picked.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Name of the selected entry.
    pub fn selected_name(&self) -> Option<&str> {
        self.selected.map(|i| self.entries[i].as_str())
    }

    /// Select an entry, clamping to the list tail.
    pub fn select(&mut self, index: usize) {
        self.selected = if self.entries.is_empty() {
            None
        } else {
            Some(index.min(self.entries.len() - 1))
        };
    }

    pub(crate) fn push(&mut self, name: String) {
        self.entries.push(name);
    }

    pub(crate) fn set_entry(&mut self, index: usize, name: String) {
        self.entries[index] = name;
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.selected = None;
    }

    fn remove(&mut self, index: usize) -> String {
        self.entries.remove(index)
    }
}

/// Result of a merge edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub source: String,
    pub target: String,
    /// Objects moved into the target group. Zero for an empty source group,
    /// which still dissolves.
    pub moved: usize,
}

/// One vehicle's in-progress repair state: the keep/discard lists and, for
/// air vehicles, the designated body reference object.
#[derive(Debug, Clone)]
pub struct RepairSession {
    vehicle: Vehicle,
    pub keep: GroupList,
    pub discard: GroupList,
    body_object: Option<String>,
}

impl RepairSession {
    pub fn new(vehicle: Vehicle) -> Self {
        Self {
            vehicle,
            keep: GroupList::new(),
            discard: GroupList::new(),
            body_object: None,
        }
    }

    pub fn vehicle(&self) -> Vehicle {
        self.vehicle
    }

    pub fn list(&self, kind: ListKind) -> &GroupList {
        match kind {
            ListKind::Keep => &self.keep,
            ListKind::Discard => &self.discard,
        }
    }

    /// The object designated as the air vehicle's body reference.
    pub fn body_object(&self) -> Option<&str> {
        self.body_object.as_deref()
    }

    pub(crate) fn set_body_object(&mut self, name: String) {
        self.body_object = Some(name);
    }

    /// Clear both lists, the selections, and the body designation.
    pub fn clear_lists(&mut self) {
        self.keep.clear();
        self.discard.clear();
        self.body_object = None;
    }

    /// Move the selected entry of `from` to the tail of the opposite list.
    ///
    /// The group keeps its name and backing sub-collection; only list
    /// membership changes. The target selects its new tail; the source
    /// selects the entry above the removed one, clamped.
    pub fn move_selected(&mut self, from: ListKind) -> RepairResult<String> {
        let (source, target) = match from {
            ListKind::Keep => (&mut self.keep, &mut self.discard),
            ListKind::Discard => (&mut self.discard, &mut self.keep),
        };

        let index = source.selected.ok_or(RepairError::NoSelection)?;
        let name = source.remove(index);
        target.push(name.clone());

        source.selected = if source.entries.is_empty() {
            None
        } else {
            Some(index.saturating_sub(1).min(source.entries.len() - 1))
        };
        target.selected = Some(target.entries.len() - 1);

        Ok(name)
    }

    /// Swap the selected entry with its neighbor in the given direction.
    /// Rejected at either list boundary.
    pub fn reorder(&mut self, kind: ListKind, direction: MoveDir) -> RepairResult<()> {
        let list = match kind {
            ListKind::Keep => &mut self.keep,
            ListKind::Discard => &mut self.discard,
        };
        let index = list.selected.ok_or(RepairError::NoSelection)?;
        let neighbor = Self::neighbor(index, direction, list.entries.len())?;

        list.entries.swap(index, neighbor);
        list.selected = Some(neighbor);
        Ok(())
    }

    /// Merge the selected group into its neighbor in the given direction:
    /// move every object across, dissolve the source sub-collection, and
    /// drop the source entry. Rejected at list boundaries; an empty source
    /// group merges as an informational no-op.
    pub fn merge_adjacent<S: SceneRepository>(
        &mut self,
        scene: &mut S,
        kind: ListKind,
        direction: MoveDir,
    ) -> RepairResult<MergeOutcome> {
        let list = match kind {
            ListKind::Keep => &mut self.keep,
            ListKind::Discard => &mut self.discard,
        };
        let index = list.selected.ok_or(RepairError::NoSelection)?;
        let neighbor = Self::neighbor(index, direction, list.entries.len())?;

        let source = list.entries[index].clone();
        let target = list.entries[neighbor].clone();

        // Validate everything before the first mutation.
        for name in [&source, &target] {
            if !scene.has_collection(name) {
                return Err(SceneError::CollectionNotFound(name.clone()).into());
            }
        }

        let objects = scene.collection_objects(&source);
        if objects.is_empty() {
            info!("group '{source}' is empty, no objects to move");
        }
        for object in &objects {
            scene.move_object(object, &target)?;
        }
        scene.remove_collection(&source)?;

        list.remove(index);
        // The target shifts down by one when it sat below the source.
        let target_index = match direction {
            MoveDir::Up => neighbor,
            MoveDir::Down => index,
        };
        list.selected = Some(target_index);

        info!("merged '{source}' into '{target}'");
        Ok(MergeOutcome {
            source,
            target,
            moved: objects.len(),
        })
    }

    /// Dissolve every sub-group under the work collection, moving all member
    /// objects back to the root, and reset both lists. Idempotent; safe to
    /// call with no prior groups or no work collection at all.
    pub fn rollback<S: SceneRepository>(&mut self, scene: &mut S) -> RepairResult<usize> {
        let work = self.vehicle.work_collection();
        if !scene.has_collection(work) {
            self.clear_lists();
            return Ok(0);
        }

        let mut moved = 0;
        for group in scene.child_collections(work) {
            for object in scene.collection_objects(&group) {
                scene.move_object(&object, work)?;
                moved += 1;
            }
            scene.remove_collection(&group)?;
        }

        self.clear_lists();
        if moved > 0 {
            info!("rollback moved {moved} objects back to '{work}'");
        }
        Ok(moved)
    }

    fn neighbor(index: usize, direction: MoveDir, len: usize) -> RepairResult<usize> {
        match direction {
            MoveDir::Up => index.checked_sub(1).ok_or(RepairError::AtBoundary),
            MoveDir::Down => {
                let next = index + 1;
                if next < len {
                    Ok(next)
                } else {
                    Err(RepairError::AtBoundary)
                }
            }
        }
    }
}
