//! Material Synthesis
//!
//! Derives one material per surviving group from the group's canonical name
//! and representative texture. Runs in two steps, mirroring the interactive
//! workflow: analyze (build the plan, push stale zero-user materials aside
//! under an `.orphan` suffix) and assign (create or reuse the material, wire
//! its graph, replace every member's slots, then garbage-collect unused
//! materials that this run did not touch).

use ahash::AHashSet;
use log::info;

use hangar_scene::{
    NodeKind, ObjectKind, SceneRepository, SOCKET_BASE_COLOR, SOCKET_BSDF, SOCKET_COLOR,
    SOCKET_SURFACE,
};

use crate::store::Vehicle;
use crate::tag::canonical_material_name;
use crate::texture::resolve_base_color;
use crate::{RepairError, RepairResult};

/// The set of material names the next assign pass will produce.
#[derive(Debug, Clone, Default)]
pub struct MaterialPlan {
    /// Canonical material names, sorted and deduplicated.
    pub names: Vec<String>,
}

impl MaterialPlan {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Summary of an assign pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignReport {
    /// Objects whose slots were replaced.
    pub objects_assigned: usize,
    /// Unused materials deleted by the trailing GC pass.
    pub materials_removed: usize,
}

/// Build the material plan for the groups under the work collection.
///
/// Existing zero-user materials carrying a planned name are renamed with an
/// `.orphan` suffix so a stale instance is never silently reused. A work
/// collection without groups yields an empty plan (soft no-op).
pub fn analyze_materials<S: SceneRepository>(
    scene: &mut S,
    vehicle: Vehicle,
) -> RepairResult<MaterialPlan> {
    let work = vehicle.work_collection();
    if !scene.has_collection(work) {
        return Err(RepairError::WorkCollectionMissing(work.to_owned()));
    }

    let groups = scene.child_collections(work);
    if groups.is_empty() {
        info!("no groups under '{work}', classify first");
        return Ok(MaterialPlan::default());
    }

    let mut names: Vec<String> = groups
        .iter()
        .map(|g| canonical_material_name(g).to_owned())
        .collect();

    for name in &names {
        if scene.has_material(name) && scene.material_users(name) == 0 {
            let orphan = orphan_name(scene, name);
            scene.rename_material(name, &orphan)?;
            info!("renamed stale material '{name}' to '{orphan}'");
        }
    }

    names.sort_unstable();
    names.dedup();
    info!("{} materials to assign", names.len());
    Ok(MaterialPlan { names })
}

/// Synthesize and assign one material per group under the work collection.
///
/// Each group's material gets exactly one principled node wired to the
/// output surface and, when the group's first member resolves to an image,
/// an image texture node linked to base color (reusing a node already
/// carrying the same image, never duplicating a correct link). Member slot
/// lists are replaced wholesale. Materials left with zero users that this
/// run did not touch are deleted afterwards.
pub fn assign_materials<S: SceneRepository>(
    scene: &mut S,
    vehicle: Vehicle,
    plan: &MaterialPlan,
) -> RepairResult<AssignReport> {
    if plan.is_empty() {
        return Err(RepairError::EmptyPlan);
    }
    let work = vehicle.work_collection();
    if !scene.has_collection(work) {
        return Err(RepairError::WorkCollectionMissing(work.to_owned()));
    }

    let mut touched: AHashSet<String> = AHashSet::new();
    let mut objects_assigned = 0;

    for group in scene.child_collections(work) {
        let mat_name = canonical_material_name(&group).to_owned();
        if !scene.has_material(&mat_name) {
            scene.create_material(&mat_name)?;
        }
        touched.insert(mat_name.clone());

        let members = scene.collection_objects(&group);
        let image = members
            .first()
            .and_then(|first| resolve_base_color(scene, first));

        {
            let graph = scene.material_graph_mut(&mat_name)?;

            let bsdf = match graph.first_node(NodeKind::PrincipledBsdf) {
                Some(node) => node.id,
                None => {
                    graph.clear();
                    let bsdf = graph.add_node(NodeKind::PrincipledBsdf);
                    let output = graph.add_node(NodeKind::MaterialOutput);
                    graph.connect(bsdf, SOCKET_BSDF, output, SOCKET_SURFACE);
                    bsdf
                }
            };

            if let Some(image) = image {
                let existing = graph
                    .nodes()
                    .find(|n| n.kind == NodeKind::ImageTexture && n.image.as_ref() == Some(&image))
                    .map(|n| n.id);
                match existing {
                    Some(tex) => {
                        if !graph.has_link(tex, bsdf, SOCKET_BASE_COLOR) {
                            graph.connect(tex, SOCKET_COLOR, bsdf, SOCKET_BASE_COLOR);
                        }
                    }
                    None => {
                        let tex = graph.add_image_node(image);
                        graph.connect(tex, SOCKET_COLOR, bsdf, SOCKET_BASE_COLOR);
                    }
                }
            }
        }

        let slots = [mat_name];
        for member in &members {
            if scene.object_kind(member) == Some(ObjectKind::Mesh) {
                scene.set_object_materials(member, &slots)?;
                objects_assigned += 1;
            }
        }
    }

    // GC pass: anything unused that we did not just synthesize goes away.
    let mut materials_removed = 0;
    for name in scene.material_names() {
        if scene.material_users(&name) == 0 && !touched.contains(&name) {
            scene.remove_material(&name)?;
            materials_removed += 1;
        }
    }

    info!("assigned materials to {objects_assigned} objects, removed {materials_removed} unused");
    Ok(AssignReport {
        objects_assigned,
        materials_removed,
    })
}

/// First free name in the `.orphan` series for a stale material.
fn orphan_name<S: SceneRepository>(scene: &S, name: &str) -> String {
    let mut candidate = format!("{name}.orphan");
    let mut counter = 1;
    while scene.has_material(&candidate) {
        candidate = format!("{name}.orphan.{counter:03}");
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_scene::{Material, MemoryScene, MeshObject, ObjectKind};

    fn group_with_member(
        scene: &mut MemoryScene,
        work: &str,
        group: &str,
        object: &str,
        texture: Option<&str>,
    ) {
        scene.add_collection(group, Some(work));
        let mut obj = MeshObject::new(object, ObjectKind::Mesh);
        if let Some(texture) = texture {
            let mat = format!("Import_{object}");
            scene.add_material(Material::with_base_color(&mat, texture));
            obj.material_slots.push(mat);
        }
        scene.add_object(obj, Some(group));
    }

    fn ground_work() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.add_collection("Ground_Work", None);
        scene
    }

    #[test]
    fn test_analyze_builds_sorted_unique_plan() {
        let mut scene = ground_work();
        group_with_member(&mut scene, "Ground_Work", "[Turret_1] (a.dds)", "A", None);
        group_with_member(&mut scene, "Ground_Work", "[Body] (b.dds)", "B", None);

        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        assert_eq!(plan.names, ["Body", "Turret_1"]);
    }

    #[test]
    fn test_analyze_renames_orphans() {
        let mut scene = ground_work();
        group_with_member(&mut scene, "Ground_Work", "[Body] (b.dds)", "B", None);
        // A stale zero-user material with the planned name.
        scene.add_material(Material::new("Body"));

        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();

        assert_eq!(plan.names, ["Body"]);
        assert!(scene.has_material("Body.orphan"));
        assert!(!scene.has_material("Body"));
    }

    #[test]
    fn test_analyze_keeps_used_materials() {
        let mut scene = ground_work();
        group_with_member(&mut scene, "Ground_Work", "[Body] (b.dds)", "B", None);
        scene.add_material(Material::new("Body"));
        let mut user = MeshObject::new("User", ObjectKind::Mesh);
        user.material_slots.push("Body".to_owned());
        scene.add_object(user, None);

        analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        assert!(scene.has_material("Body"));
        assert!(!scene.has_material("Body.orphan"));
    }

    #[test]
    fn test_analyze_without_groups_is_soft_noop() {
        let mut scene = ground_work();
        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_assign_synthesizes_wired_material() {
        let mut scene = ground_work();
        group_with_member(
            &mut scene,
            "Ground_Work",
            "[Turret] (t.dds)",
            "Cupola",
            Some("//tex/T.dds"),
        );

        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        let report = assign_materials(&mut scene, Vehicle::Ground, &plan).unwrap();

        assert_eq!(report.objects_assigned, 1);
        assert_eq!(scene.object_materials("Cupola"), ["Turret"]);

        let graph = scene.material_graph("Turret").unwrap();
        let bsdf = graph.first_node(NodeKind::PrincipledBsdf).unwrap();
        let source = graph.input_source(bsdf.id, SOCKET_BASE_COLOR).unwrap();
        assert_eq!(source.kind, NodeKind::ImageTexture);
        assert_eq!(source.image.as_ref().unwrap().filepath, "//tex/T.dds");

        // The import material lost its only user and is collected.
        assert!(!scene.has_material("Import_Cupola"));
        assert_eq!(report.materials_removed, 1);
    }

    #[test]
    fn test_assign_does_not_duplicate_links() {
        let mut scene = ground_work();
        group_with_member(
            &mut scene,
            "Ground_Work",
            "[Body] (b.dds)",
            "Hull",
            Some("b.dds"),
        );

        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        assign_materials(&mut scene, Vehicle::Ground, &plan).unwrap();
        let links_after_first = scene.material_graph("Body").unwrap().links().len();

        // Second pass finds the correct wiring already in place.
        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        assign_materials(&mut scene, Vehicle::Ground, &plan).unwrap();
        let graph = scene.material_graph("Body").unwrap();

        assert_eq!(graph.links().len(), links_after_first);
        assert_eq!(
            graph
                .nodes()
                .filter(|n| n.kind == NodeKind::ImageTexture)
                .count(),
            1
        );
    }

    #[test]
    fn test_assign_without_texture_still_builds_shader() {
        let mut scene = ground_work();
        group_with_member(&mut scene, "Ground_Work", "[No Texture]", "Bare", None);

        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        assign_materials(&mut scene, Vehicle::Ground, &plan).unwrap();

        let graph = scene.material_graph("No Texture").unwrap();
        assert!(graph.first_node(NodeKind::PrincipledBsdf).is_some());
        assert!(graph.first_node(NodeKind::ImageTexture).is_none());
        assert_eq!(scene.object_materials("Bare"), ["No Texture"]);
    }

    #[test]
    fn test_assign_shares_material_across_group_members() {
        let mut scene = ground_work();
        scene.add_collection("[Gun] (g.dds)", Some("Ground_Work"));
        for name in ["Barrel", "Breech"] {
            let mut obj = MeshObject::new(name, ObjectKind::Mesh);
            let mat = format!("Import_{name}");
            scene.add_material(Material::with_base_color(&mat, "g.dds"));
            obj.material_slots.push(mat);
            scene.add_object(obj, Some("[Gun] (g.dds)"));
        }

        let plan = analyze_materials(&mut scene, Vehicle::Ground).unwrap();
        let report = assign_materials(&mut scene, Vehicle::Ground, &plan).unwrap();

        assert_eq!(report.objects_assigned, 2);
        assert_eq!(scene.object_materials("Barrel"), ["Gun"]);
        assert_eq!(scene.object_materials("Breech"), ["Gun"]);
        assert_eq!(scene.material_users("Gun"), 2);
    }

    #[test]
    fn test_assign_empty_plan_rejected() {
        let mut scene = ground_work();
        let plan = MaterialPlan::default();
        assert!(matches!(
            assign_materials(&mut scene, Vehicle::Ground, &plan),
            Err(RepairError::EmptyPlan)
        ));
    }
}
