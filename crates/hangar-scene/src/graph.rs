//! Shader Graph
//!
//! Minimal node-graph representation of a material's shading network.
//! Only the node kinds the repair pipeline inspects or synthesizes are
//! modeled: a principled BSDF, an image texture, and the material output.
//! Links are addressed by named sockets, matching the host's socket names.

use serde::{Deserialize, Serialize};

use crate::ImageRef;

/// Socket receiving a material's albedo input.
pub const SOCKET_BASE_COLOR: &str = "Base Color";
/// Socket receiving the final shader on the output node.
pub const SOCKET_SURFACE: &str = "Surface";
/// Color output socket of an image texture node.
pub const SOCKET_COLOR: &str = "Color";
/// Shader output socket of a principled BSDF node.
pub const SOCKET_BSDF: &str = "BSDF";

/// Identifier of a node within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Node kinds relevant to base-color resolution and synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Principled BSDF shader node.
    PrincipledBsdf,
    /// Image texture sampler node.
    ImageTexture,
    /// Material output node.
    MaterialOutput,
}

/// A single node in a shader graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Image backing an `ImageTexture` node. Unset for other kinds and for
    /// texture nodes with no image assigned.
    pub image: Option<ImageRef>,
}

/// A directed link between two node sockets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderLink {
    pub from: NodeId,
    pub from_socket: String,
    pub to: NodeId,
    pub to_socket: String,
}

/// A material's shading network.
///
/// Nodes keep declaration order; iteration over them is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaderGraph {
    nodes: Vec<ShaderNode>,
    links: Vec<ShaderLink>,
}

impl ShaderGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.iter().map(|n| n.id.0 + 1).max().unwrap_or(0))
    }

    /// Add a node of the given kind, returning its id.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.next_id();
        self.nodes.push(ShaderNode {
            id,
            kind,
            image: None,
        });
        id
    }

    /// Add an image texture node backed by `image`.
    pub fn add_image_node(&mut self, image: ImageRef) -> NodeId {
        let id = self.next_id();
        self.nodes.push(ShaderNode {
            id,
            kind: NodeKind::ImageTexture,
            image: Some(image),
        });
        id
    }

    /// Connect `from`'s output socket to `to`'s input socket.
    pub fn connect(&mut self, from: NodeId, from_socket: &str, to: NodeId, to_socket: &str) {
        self.links.push(ShaderLink {
            from,
            from_socket: from_socket.to_owned(),
            to,
            to_socket: to_socket.to_owned(),
        });
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Iterate nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &ShaderNode> {
        self.nodes.iter()
    }

    /// All links in the graph.
    pub fn links(&self) -> &[ShaderLink] {
        &self.links
    }

    /// First node of the given kind, in declaration order.
    pub fn first_node(&self, kind: NodeKind) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.kind == kind)
    }

    /// The node driving `to`'s input socket, if any. When several links
    /// target the same socket the first one wins.
    pub fn input_source(&self, to: NodeId, to_socket: &str) -> Option<&ShaderNode> {
        let link = self
            .links
            .iter()
            .find(|l| l.to == to && l.to_socket == to_socket)?;
        self.node(link.from)
    }

    /// Whether a link from `from` into `to`'s named socket exists.
    pub fn has_link(&self, from: NodeId, to: NodeId, to_socket: &str) -> bool {
        self.links
            .iter()
            .any(|l| l.from == from && l.to == to && l.to_socket == to_socket)
    }

    /// Remove every node and link.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find_nodes() {
        let mut graph = ShaderGraph::new();
        let bsdf = graph.add_node(NodeKind::PrincipledBsdf);
        let out = graph.add_node(NodeKind::MaterialOutput);

        assert_ne!(bsdf, out);
        assert_eq!(
            graph.first_node(NodeKind::PrincipledBsdf).unwrap().id,
            bsdf
        );
        assert!(graph.first_node(NodeKind::ImageTexture).is_none());
    }

    #[test]
    fn test_input_source_follows_first_link() {
        let mut graph = ShaderGraph::new();
        let tex = graph.add_image_node(ImageRef::new("//textures/hull.dds"));
        let bsdf = graph.add_node(NodeKind::PrincipledBsdf);
        graph.connect(tex, SOCKET_COLOR, bsdf, SOCKET_BASE_COLOR);

        let source = graph.input_source(bsdf, SOCKET_BASE_COLOR).unwrap();
        assert_eq!(source.id, tex);
        assert_eq!(source.kind, NodeKind::ImageTexture);

        assert!(graph.input_source(bsdf, SOCKET_SURFACE).is_none());
    }

    #[test]
    fn test_has_link() {
        let mut graph = ShaderGraph::new();
        let tex = graph.add_image_node(ImageRef::new("a.png"));
        let bsdf = graph.add_node(NodeKind::PrincipledBsdf);

        assert!(!graph.has_link(tex, bsdf, SOCKET_BASE_COLOR));
        graph.connect(tex, SOCKET_COLOR, bsdf, SOCKET_BASE_COLOR);
        assert!(graph.has_link(tex, bsdf, SOCKET_BASE_COLOR));
    }

    #[test]
    fn test_clear_resets_ids() {
        let mut graph = ShaderGraph::new();
        graph.add_node(NodeKind::PrincipledBsdf);
        graph.clear();
        assert!(graph.is_empty());

        let id = graph.add_node(NodeKind::MaterialOutput);
        assert_eq!(id, NodeId(0));
    }
}
