//! Classification
//!
//! Rule engines partitioning a work collection's root objects into named
//! discard groups and named keep groups. Object names and texture keys are
//! matched against fixed substring rule tables; surviving objects are
//! bucketed by texture key, keys are folded into base-name families, and
//! multi-key families get `_1.._N` suffixes in sorted-key order.
//!
//! The candidate set is snapshotted before any relocation, and the in-memory
//! scene iterates in insertion order, so classifying the same scene twice
//! (with a rollback in between) produces identical partitions.

use indexmap::IndexMap;
use log::{debug, info};

use hangar_scene::{ObjectKind, SceneRepository};

use crate::store::{RepairSession, Vehicle};
use crate::tag::{DiscardTag, KeepTag};
use crate::texture::resolve_key;
use crate::{RepairError, RepairResult};

/// Object-name discard rules for ground vehicles, first match wins.
const GROUND_NAME_RULES: &[&str] = &["_track", "_mg_", "net_"];
/// Texture-key discard rules for ground vehicles.
const GROUND_TEXTURE_RULES: &[&str] = &["glass", "track", "mg", "net"];
/// Texture-key discard rules for air vehicles (cockpit interiors).
const AIR_TEXTURE_RULES: &[&str] = &["inside_", "seat_", "interior_"];

/// Classification switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions {
    /// Air only: reroute finalized `Pylon` and `DropTank` groups into the
    /// discard list instead of the keep list.
    pub keep_body_only: bool,
}

/// Summary of one classification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyReport {
    pub keep_groups: usize,
    pub discard_groups: usize,
    /// Objects relocated into a sub-group.
    pub grouped_objects: usize,
}

/// Outcome of designating an air vehicle's body object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecifyOutcome {
    /// Objects sharing the body texture were grouped.
    Grouped(usize),
    /// The body group already exists; nothing changed.
    GroupExists(String),
    /// No root object shares the body texture; nothing changed.
    NoMatches,
}

/// Classify the ungrouped root objects of the session's work collection.
///
/// Ground sessions roll back any previous grouping first; air sessions run
/// over whatever remains ungrouped after `specify_body`, appending to the
/// existing lists. An empty work collection is a soft no-op.
pub fn classify<S: SceneRepository>(
    scene: &mut S,
    session: &mut RepairSession,
    options: ClassifyOptions,
) -> RepairResult<ClassifyReport> {
    let vehicle = session.vehicle();
    let work = vehicle.work_collection();
    if !scene.has_collection(work) {
        return Err(RepairError::WorkCollectionMissing(work.to_owned()));
    }

    if vehicle == Vehicle::Ground {
        session.rollback(scene)?;
    }

    let roots = scene.collection_objects(work);
    if roots.is_empty() {
        info!("'{work}' is empty, nothing to classify");
        return Ok(ClassifyReport::default());
    }

    // Partition pass over a snapshot: discard buckets and keep candidates.
    let mut discard_buckets: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut candidates: Vec<(String, String)> = Vec::new();

    for object in &roots {
        if scene.object_kind(object) != Some(ObjectKind::Mesh) {
            continue;
        }

        if vehicle == Vehicle::Ground {
            let lower = object.to_lowercase();
            if let Some(rule) = GROUND_NAME_RULES.iter().copied().find(|r| lower.contains(r)) {
                discard_buckets
                    .entry(DiscardTag::Name(rule).to_string())
                    .or_default()
                    .push(object.clone());
                continue;
            }
        }

        let texture_rules = match vehicle {
            Vehicle::Ground => GROUND_TEXTURE_RULES,
            Vehicle::Air => AIR_TEXTURE_RULES,
        };
        match resolve_key(scene, object) {
            Some(key) => {
                if let Some(rule) = texture_rules.iter().copied().find(|r| key.contains(r)) {
                    discard_buckets
                        .entry(DiscardTag::Texture(rule).to_string())
                        .or_default()
                        .push(object.clone());
                } else {
                    candidates.push((object.clone(), key));
                }
            }
            None => {
                discard_buckets
                    .entry(DiscardTag::NoTexture.to_string())
                    .or_default()
                    .push(object.clone());
            }
        }
    }

    // First observation of a key seeds its base family; later occurrences
    // reuse it.
    let mut key_base: IndexMap<String, &'static str> = IndexMap::new();
    for (_, key) in &candidates {
        key_base
            .entry(key.clone())
            .or_insert_with(|| infer_base(vehicle, key));
    }

    // Fold keys into families and hand out suffixes in sorted-key order.
    let mut families: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (key, base) in &key_base {
        families.entry(*base).or_default().push(key.as_str());
    }
    let mut key_tags: IndexMap<&str, KeepTag> = IndexMap::new();
    for (base, mut keys) in families {
        keys.sort_unstable();
        let multi = keys.len() > 1;
        for (i, key) in keys.into_iter().enumerate() {
            let mut tag = KeepTag::new(base).with_texture_key(key);
            if multi {
                tag = tag.with_suffix((i + 1) as u32);
            }
            debug!("key '{key}' -> {tag}");
            key_tags.insert(key, tag);
        }
    }

    let mut keep_buckets: IndexMap<String, Vec<String>> = IndexMap::new();
    for (object, key) in &candidates {
        let Some(tag) = key_tags.get(key.as_str()) else {
            continue;
        };
        keep_buckets
            .entry(tag.to_string())
            .or_default()
            .push(object.clone());
    }

    // Commit keep groups, then discard groups, each in lexicographic name
    // order.
    let mut report = ClassifyReport::default();

    let mut keep_names: Vec<String> = keep_buckets.keys().cloned().collect();
    keep_names.sort_unstable();
    for name in &keep_names {
        let objects = &keep_buckets[name];
        let reroute = vehicle == Vehicle::Air
            && options.keep_body_only
            && (name.contains("Pylon") || name.contains("DropTank"));
        if reroute {
            session.discard.push(name.clone());
            report.discard_groups += 1;
        } else {
            session.keep.push(name.clone());
            report.keep_groups += 1;
        }
        relocate(scene, work, name, objects)?;
        report.grouped_objects += objects.len();
    }

    let mut discard_names: Vec<String> = discard_buckets.keys().cloned().collect();
    discard_names.sort_unstable();
    for name in &discard_names {
        let objects = &discard_buckets[name];
        session.discard.push(name.clone());
        report.discard_groups += 1;
        relocate(scene, work, name, objects)?;
        report.grouped_objects += objects.len();
    }

    info!(
        "classified {} objects into {} keep / {} discard groups",
        report.grouped_objects, report.keep_groups, report.discard_groups
    );
    Ok(report)
}

/// Designate the air vehicle's body: move every root object sharing the
/// active object's texture key into a `[Body] (<key>)` keep group.
///
/// Fails without side effects when no active mesh object is given or its
/// texture cannot be resolved.
pub fn specify_body<S: SceneRepository>(
    scene: &mut S,
    session: &mut RepairSession,
    active_object: &str,
) -> RepairResult<SpecifyOutcome> {
    if scene.object_kind(active_object) != Some(ObjectKind::Mesh) {
        return Err(RepairError::NoActiveObject);
    }
    let work = session.vehicle().work_collection();
    if !scene.has_collection(work) {
        return Err(RepairError::WorkCollectionMissing(work.to_owned()));
    }
    let key =
        resolve_key(scene, active_object).ok_or_else(|| RepairError::NoTexture(active_object.to_owned()))?;

    let group = KeepTag::new("Body").with_texture_key(&key).to_string();
    if scene.has_collection(&group) {
        info!("group '{group}' already exists");
        return Ok(SpecifyOutcome::GroupExists(group));
    }

    let matching: Vec<String> = scene
        .collection_objects(work)
        .into_iter()
        .filter(|o| scene.object_kind(o) == Some(ObjectKind::Mesh))
        .filter(|o| resolve_key(scene, o).as_deref() == Some(key.as_str()))
        .collect();
    if matching.is_empty() {
        info!("no objects share texture '{key}'");
        return Ok(SpecifyOutcome::NoMatches);
    }

    relocate(scene, work, &group, &matching)?;
    session.keep.push(group.clone());
    session.set_body_object(active_object.to_owned());

    info!("moved {} objects into '{group}'", matching.len());
    Ok(SpecifyOutcome::Grouped(matching.len()))
}

/// Infer the base family name from a texture key.
fn infer_base(vehicle: Vehicle, key: &str) -> &'static str {
    match vehicle {
        Vehicle::Ground => {
            if key.contains("gun") {
                "Gun"
            } else if key.contains("body") {
                if key.contains("_add") {
                    "BodyAdd"
                } else {
                    "Body"
                }
            } else if key.contains("turret") {
                if key.contains("_add") {
                    "TurretAdd"
                } else {
                    "Turret"
                }
            } else {
                "Add"
            }
        }
        Vehicle::Air => {
            if key.contains("pylon") {
                "Pylon"
            } else if key.contains("drop_tank") {
                "DropTank"
            } else {
                "Add"
            }
        }
    }
}

/// Move objects into a sub-collection of the work collection, creating or
/// reusing it by name.
fn relocate<S: SceneRepository>(
    scene: &mut S,
    work: &str,
    group: &str,
    objects: &[String],
) -> RepairResult<()> {
    if !scene.has_collection(group) {
        scene.create_collection(group, Some(work))?;
    }
    for object in objects {
        scene.move_object(object, group)?;
    }
    Ok(())
}
