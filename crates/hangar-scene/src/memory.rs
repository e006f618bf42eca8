//! In-Memory Scene
//!
//! Deterministic [`SceneRepository`] implementation backing tests and the
//! batch CLI. Registries are name-keyed and iteration follows insertion
//! order everywhere, so a classification run over the same scene file always
//! sees objects in the same order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    Collection, Material, MeshObject, ObjectKind, SceneError, SceneRepository, SceneResult,
    ShaderGraph,
};

/// An entire scene held in memory: objects, collections, and materials.
///
/// Serializable with serde; the CLI reads and writes scenes as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryScene {
    objects: IndexMap<String, MeshObject>,
    collections: IndexMap<String, Collection>,
    materials: IndexMap<String, Material>,
}

impl MemoryScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a collection, optionally linking it under an existing parent.
    /// Fixture helper; replaces any collection of the same name.
    pub fn add_collection(&mut self, name: &str, parent: Option<&str>) {
        self.collections
            .insert(name.to_owned(), Collection::new(name));
        if let Some(parent) = parent {
            if let Some(coll) = self.collections.get_mut(parent) {
                coll.children.push(name.to_owned());
            }
        }
    }

    /// Insert an object, optionally linking it into an existing collection.
    /// Fixture helper; replaces any object of the same name.
    pub fn add_object(&mut self, object: MeshObject, collection: Option<&str>) {
        let name = object.name.clone();
        self.objects.insert(name.clone(), object);
        if let Some(collection) = collection {
            if let Some(coll) = self.collections.get_mut(collection) {
                coll.objects.push(name);
            }
        }
    }

    /// Insert a material. Fixture helper; replaces any material of the same
    /// name.
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Total number of objects in the scene.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn unlink_object(&mut self, name: &str) {
        for coll in self.collections.values_mut() {
            coll.objects.retain(|o| o != name);
        }
    }
}

impl SceneRepository for MemoryScene {
    fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    fn create_collection(&mut self, name: &str, parent: Option<&str>) -> SceneResult<()> {
        if self.collections.contains_key(name) {
            return Err(SceneError::NameTaken(name.to_owned()));
        }
        if let Some(parent) = parent {
            if !self.collections.contains_key(parent) {
                return Err(SceneError::CollectionNotFound(parent.to_owned()));
            }
        }
        self.collections
            .insert(name.to_owned(), Collection::new(name));
        if let Some(parent) = parent {
            self.collections
                .get_mut(parent)
                .expect("parent checked above")
                .children
                .push(name.to_owned());
        }
        Ok(())
    }

    fn remove_collection(&mut self, name: &str) -> SceneResult<()> {
        if self.collections.shift_remove(name).is_none() {
            return Err(SceneError::CollectionNotFound(name.to_owned()));
        }
        for coll in self.collections.values_mut() {
            coll.children.retain(|c| c != name);
        }
        Ok(())
    }

    fn rename_collection(&mut self, old: &str, new: &str) -> SceneResult<()> {
        if self.collections.contains_key(new) {
            return Err(SceneError::NameTaken(new.to_owned()));
        }
        let mut coll = self
            .collections
            .shift_remove(old)
            .ok_or_else(|| SceneError::CollectionNotFound(old.to_owned()))?;
        coll.name = new.to_owned();
        self.collections.insert(new.to_owned(), coll);
        for coll in self.collections.values_mut() {
            for child in &mut coll.children {
                if child == old {
                    *child = new.to_owned();
                }
            }
        }
        Ok(())
    }

    fn child_collections(&self, name: &str) -> Vec<String> {
        self.collections
            .get(name)
            .map(|c| c.children.clone())
            .unwrap_or_default()
    }

    fn collection_objects(&self, name: &str) -> Vec<String> {
        self.collections
            .get(name)
            .map(|c| c.objects.clone())
            .unwrap_or_default()
    }

    fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    fn object_kind(&self, name: &str) -> Option<ObjectKind> {
        self.objects.get(name).map(|o| o.kind)
    }

    fn move_object(&mut self, object: &str, to: &str) -> SceneResult<()> {
        if !self.objects.contains_key(object) {
            return Err(SceneError::ObjectNotFound(object.to_owned()));
        }
        if !self.collections.contains_key(to) {
            return Err(SceneError::CollectionNotFound(to.to_owned()));
        }
        self.unlink_object(object);
        self.collections
            .get_mut(to)
            .expect("target checked above")
            .objects
            .push(object.to_owned());
        Ok(())
    }

    fn remove_object(&mut self, name: &str) -> SceneResult<()> {
        if self.objects.shift_remove(name).is_none() {
            return Err(SceneError::ObjectNotFound(name.to_owned()));
        }
        self.unlink_object(name);
        Ok(())
    }

    fn object_materials(&self, object: &str) -> Vec<String> {
        self.objects
            .get(object)
            .map(|o| o.material_slots.to_vec())
            .unwrap_or_default()
    }

    fn set_object_materials(&mut self, object: &str, materials: &[String]) -> SceneResult<()> {
        for mat in materials {
            if !self.materials.contains_key(mat) {
                return Err(SceneError::MaterialNotFound(mat.clone()));
            }
        }
        let obj = self
            .objects
            .get_mut(object)
            .ok_or_else(|| SceneError::ObjectNotFound(object.to_owned()))?;
        obj.material_slots = materials.iter().cloned().collect();
        Ok(())
    }

    fn has_material(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    fn create_material(&mut self, name: &str) -> SceneResult<()> {
        if self.materials.contains_key(name) {
            return Err(SceneError::NameTaken(name.to_owned()));
        }
        self.materials.insert(name.to_owned(), Material::new(name));
        Ok(())
    }

    fn rename_material(&mut self, old: &str, new: &str) -> SceneResult<()> {
        if self.materials.contains_key(new) {
            return Err(SceneError::NameTaken(new.to_owned()));
        }
        let mut mat = self
            .materials
            .shift_remove(old)
            .ok_or_else(|| SceneError::MaterialNotFound(old.to_owned()))?;
        mat.name = new.to_owned();
        self.materials.insert(new.to_owned(), mat);
        for obj in self.objects.values_mut() {
            for slot in &mut obj.material_slots {
                if slot == old {
                    *slot = new.to_owned();
                }
            }
        }
        Ok(())
    }

    fn remove_material(&mut self, name: &str) -> SceneResult<()> {
        if !self.materials.contains_key(name) {
            return Err(SceneError::MaterialNotFound(name.to_owned()));
        }
        if self.material_users(name) > 0 {
            return Err(SceneError::MaterialInUse(name.to_owned()));
        }
        self.materials.shift_remove(name);
        Ok(())
    }

    fn material_names(&self) -> Vec<String> {
        self.materials.keys().cloned().collect()
    }

    fn material_users(&self, name: &str) -> usize {
        self.objects
            .values()
            .flat_map(|o| o.material_slots.iter())
            .filter(|slot| slot.as_str() == name)
            .count()
    }

    fn material_graph(&self, name: &str) -> Option<&ShaderGraph> {
        self.materials.get(name).and_then(|m| m.graph.as_ref())
    }

    fn material_graph_mut(&mut self, name: &str) -> SceneResult<&mut ShaderGraph> {
        let mat = self
            .materials
            .get_mut(name)
            .ok_or_else(|| SceneError::MaterialNotFound(name.to_owned()))?;
        Ok(mat.graph.get_or_insert_with(ShaderGraph::new))
    }
}
