//! Texture Resolution
//!
//! Finds the image backing an object's base color and derives the
//! classification key from it. Resolution is two-pass: prefer an image
//! texture actually wired into a principled node's base-color input, then
//! fall back to the first image texture found anywhere in the visited
//! graphs. The fallback tolerates malformed import graphs where the texture
//! node exists but was never linked.

use hangar_scene::{ImageRef, NodeKind, SceneRepository, SOCKET_BASE_COLOR};

/// Resolve the base-color image of an object.
///
/// Material slots are visited in assignment order. The first slot whose
/// principled node has an image texture driving its base color wins; if no
/// slot has one, the first image texture node in any visited graph wins, in
/// slot order then node order. Objects without materials, or whose materials
/// have nodes disabled, resolve to `None`.
pub fn resolve_base_color<S: SceneRepository + ?Sized>(
    scene: &S,
    object: &str,
) -> Option<ImageRef> {
    let slots = scene.object_materials(object);

    for mat in &slots {
        let Some(graph) = scene.material_graph(mat) else {
            continue;
        };
        let Some(bsdf) = graph.first_node(NodeKind::PrincipledBsdf) else {
            continue;
        };
        if let Some(source) = graph.input_source(bsdf.id, SOCKET_BASE_COLOR) {
            if source.kind == NodeKind::ImageTexture {
                if let Some(image) = &source.image {
                    return Some(image.clone());
                }
            }
        }
    }

    for mat in &slots {
        let Some(graph) = scene.material_graph(mat) else {
            continue;
        };
        for node in graph.nodes() {
            if node.kind == NodeKind::ImageTexture {
                if let Some(image) = &node.image {
                    return Some(image.clone());
                }
            }
        }
    }

    None
}

/// Classification key of an image: the lower-cased base filename.
///
/// Source assets vary in case, so matching is case-insensitive throughout.
/// Empty paths and paths ending in a separator yield `None`.
pub fn texture_key(image: &ImageRef) -> Option<String> {
    let path = image.filepath.as_str();
    if path.is_empty() {
        return None;
    }
    // Host paths mix both separator styles.
    let base = path.rsplit(['/', '\\']).next().unwrap_or("");
    if base.is_empty() {
        return None;
    }
    Some(base.to_lowercase())
}

/// Resolve an object straight to its classification key.
pub fn resolve_key<S: SceneRepository + ?Sized>(scene: &S, object: &str) -> Option<String> {
    resolve_base_color(scene, object)
        .as_ref()
        .and_then(texture_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_scene::{
        Material, MemoryScene, MeshObject, ObjectKind, ShaderGraph, SOCKET_COLOR,
    };

    fn object_with_material(scene: &mut MemoryScene, object: &str, material: &str) {
        let mut obj = MeshObject::new(object, ObjectKind::Mesh);
        obj.material_slots.push(material.to_owned());
        scene.add_object(obj, None);
    }

    #[test]
    fn test_key_is_lowercased_basename() {
        assert_eq!(
            texture_key(&ImageRef::new("//Textures/Turret_01.DDS")),
            Some("turret_01.dds".to_owned())
        );
        assert_eq!(
            texture_key(&ImageRef::new("C:\\assets\\Body.dds")),
            Some("body.dds".to_owned())
        );
        assert_eq!(texture_key(&ImageRef::new("")), None);
        assert_eq!(texture_key(&ImageRef::new("textures/")), None);
    }

    #[test]
    fn test_linked_base_color_wins() {
        let mut scene = MemoryScene::new();
        scene.add_material(Material::with_base_color("Hull", "hull.dds"));
        object_with_material(&mut scene, "Tank", "Hull");

        assert_eq!(resolve_key(&scene, "Tank"), Some("hull.dds".to_owned()));
    }

    #[test]
    fn test_linked_slot_beats_earlier_stray_image() {
        // Slot 0 has an image node that is not wired to base color; slot 1
        // is wired correctly. The wired one must win.
        let mut scene = MemoryScene::new();
        let mut stray = ShaderGraph::new();
        stray.add_image_node(ImageRef::new("stray.dds"));
        stray.add_node(NodeKind::PrincipledBsdf);
        scene.add_material(Material {
            name: "Broken".to_owned(),
            graph: Some(stray),
        });
        scene.add_material(Material::with_base_color("Good", "good.dds"));

        let mut obj = MeshObject::new("Tank", ObjectKind::Mesh);
        obj.material_slots.push("Broken".to_owned());
        obj.material_slots.push("Good".to_owned());
        scene.add_object(obj, None);

        assert_eq!(resolve_key(&scene, "Tank"), Some("good.dds".to_owned()));
    }

    #[test]
    fn test_fallback_to_first_stray_image() {
        let mut scene = MemoryScene::new();
        let mut graph = ShaderGraph::new();
        graph.add_node(NodeKind::PrincipledBsdf);
        graph.add_image_node(ImageRef::new("unwired.dds"));
        scene.add_material(Material {
            name: "Broken".to_owned(),
            graph: Some(graph),
        });
        object_with_material(&mut scene, "Tank", "Broken");

        assert_eq!(resolve_key(&scene, "Tank"), Some("unwired.dds".to_owned()));
    }

    #[test]
    fn test_non_image_base_color_source_ignored() {
        // Base color driven by something that is not an image texture falls
        // through to the fallback pass.
        let mut scene = MemoryScene::new();
        let mut graph = ShaderGraph::new();
        let other = graph.add_node(NodeKind::MaterialOutput);
        let bsdf = graph.add_node(NodeKind::PrincipledBsdf);
        graph.connect(other, SOCKET_COLOR, bsdf, SOCKET_BASE_COLOR);
        scene.add_material(Material {
            name: "Odd".to_owned(),
            graph: Some(graph),
        });
        object_with_material(&mut scene, "Tank", "Odd");

        assert_eq!(resolve_base_color(&scene, "Tank"), None);
    }

    #[test]
    fn test_no_materials_resolves_to_none() {
        let mut scene = MemoryScene::new();
        scene.add_object(MeshObject::new("Bare", ObjectKind::Mesh), None);

        assert_eq!(resolve_base_color(&scene, "Bare"), None);

        // Nodes disabled also resolves to none.
        scene.add_material(Material {
            name: "Flat".to_owned(),
            graph: None,
        });
        object_with_material(&mut scene, "Flat_Obj", "Flat");
        assert_eq!(resolve_base_color(&scene, "Flat_Obj"), None);
    }

    #[test]
    fn test_resolution_is_stable() {
        let mut scene = MemoryScene::new();
        scene.add_material(Material::with_base_color("Hull", "hull.dds"));
        object_with_material(&mut scene, "Tank", "Hull");

        let first = resolve_key(&scene, "Tank");
        for _ in 0..10 {
            assert_eq!(resolve_key(&scene, "Tank"), first);
        }
    }
}
