//! # Hangar Scene
//!
//! Scene repository abstraction for the Hangar repair pipeline.
//!
//! The repair engine never talks to a host application directly. It operates
//! against the [`SceneRepository`] trait, which exposes the handful of scene
//! primitives the pipeline needs: named collections, named mesh objects with
//! ordered material slots, and named materials with shader graphs. The
//! in-memory implementation in [`memory`] backs tests and the batch CLI and
//! pins object iteration to insertion order, so classification runs are
//! reproducible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod graph;
pub mod memory;

pub use graph::{
    NodeId, NodeKind, ShaderGraph, ShaderLink, ShaderNode, SOCKET_BASE_COLOR, SOCKET_BSDF,
    SOCKET_COLOR, SOCKET_SURFACE,
};
pub use memory::MemoryScene;

use smallvec::SmallVec;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Material not found: {0}")]
    MaterialNotFound(String),

    #[error("Name already in use: {0}")]
    NameTaken(String),

    #[error("Material still in use: {0}")]
    MaterialInUse(String),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Reference to an image file on disk. Identity is the source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Source file path as recorded by the host, separators untouched.
    pub filepath: String,
}

impl ImageRef {
    pub fn new(filepath: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }
}

/// Object kinds found in vehicle exports. Only meshes are classified; the
/// rest ride along untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Mesh,
    Empty,
    Armature,
}

/// A scene object. Geometry is opaque to the repair pipeline; only the name
/// and the material slot list matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshObject {
    pub name: String,
    pub kind: ObjectKind,
    /// Assigned material names in slot order. The first slot is primary.
    pub material_slots: SmallVec<[String; 4]>,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            material_slots: SmallVec::new(),
        }
    }
}

/// A named, ordered container of objects with optional child collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Member object names in link order.
    pub objects: Vec<String>,
    /// Child collection names in link order.
    pub children: Vec<String>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A named material, optionally carrying a shader graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// The shading network. `None` models a material with nodes disabled.
    pub graph: Option<ShaderGraph>,
}

impl Material {
    /// New material with an empty shader graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: Some(ShaderGraph::new()),
        }
    }

    /// New material whose base color is wired to an image texture, the shape
    /// a well-formed import produces.
    pub fn with_base_color(name: impl Into<String>, filepath: impl Into<String>) -> Self {
        let mut graph = ShaderGraph::new();
        let tex = graph.add_image_node(ImageRef::new(filepath));
        let bsdf = graph.add_node(NodeKind::PrincipledBsdf);
        let out = graph.add_node(NodeKind::MaterialOutput);
        graph.connect(tex, SOCKET_COLOR, bsdf, SOCKET_BASE_COLOR);
        graph.connect(bsdf, SOCKET_BSDF, out, SOCKET_SURFACE);
        Self {
            name: name.into(),
            graph: Some(graph),
        }
    }
}

/// Capability interface over the host scene.
///
/// Every method that returns a list returns a snapshot, so callers may
/// mutate the scene while walking the result without invalidation.
pub trait SceneRepository {
    /// Whether a collection with this name exists.
    fn has_collection(&self, name: &str) -> bool;

    /// Create an empty collection, optionally linked under a parent.
    fn create_collection(&mut self, name: &str, parent: Option<&str>) -> SceneResult<()>;

    /// Delete a collection and unlink it from its parent. Member objects
    /// survive but are left outside any collection.
    fn remove_collection(&mut self, name: &str) -> SceneResult<()>;

    /// Rename a collection. Fails if the new name is taken.
    fn rename_collection(&mut self, old: &str, new: &str) -> SceneResult<()>;

    /// Child collection names of `name`, in link order.
    fn child_collections(&self, name: &str) -> Vec<String>;

    /// Member object names of `name`, in link order.
    fn collection_objects(&self, name: &str) -> Vec<String>;

    /// Whether an object with this name exists.
    fn has_object(&self, name: &str) -> bool;

    /// Kind of the named object, if it exists.
    fn object_kind(&self, name: &str) -> Option<ObjectKind>;

    /// Unlink an object from whatever collection holds it and link it into
    /// `to`. An object lives in at most one collection.
    fn move_object(&mut self, object: &str, to: &str) -> SceneResult<()>;

    /// Delete an object, unlinking it everywhere.
    fn remove_object(&mut self, name: &str) -> SceneResult<()>;

    /// Material names assigned to an object, in slot order.
    fn object_materials(&self, object: &str) -> Vec<String>;

    /// Replace an object's material slots. Every named material must exist.
    fn set_object_materials(&mut self, object: &str, materials: &[String]) -> SceneResult<()>;

    /// Whether a material with this name exists.
    fn has_material(&self, name: &str) -> bool;

    /// Create a material with an empty shader graph.
    fn create_material(&mut self, name: &str) -> SceneResult<()>;

    /// Rename a material, rewriting slot references. Fails if the new name
    /// is taken.
    fn rename_material(&mut self, old: &str, new: &str) -> SceneResult<()>;

    /// Delete a material. Fails while any object slot still references it.
    fn remove_material(&mut self, name: &str) -> SceneResult<()>;

    /// All material names, in creation order.
    fn material_names(&self) -> Vec<String>;

    /// Number of object slots referencing this material.
    fn material_users(&self, name: &str) -> usize;

    /// Read access to a material's shader graph. `None` when the material
    /// does not exist or has nodes disabled.
    fn material_graph(&self, name: &str) -> Option<&ShaderGraph>;

    /// Write access to a material's shader graph, enabling nodes first when
    /// they were disabled.
    fn material_graph_mut(&mut self, name: &str) -> SceneResult<&mut ShaderGraph>;
}
