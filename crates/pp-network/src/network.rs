//! Link geometry store and builder.
//!
//! # Data layout
//!
//! Links are stored in insertion order in a single `Vec<Link>`; a hash index
//! maps `LinkId` to position.  Each link carries its own polyline so the
//! rasterizer never has to chase node references on the hot path.
//!
//! The network is immutable after [`LinkNetworkBuilder::build`] and is
//! shared by reference between the aggregation and rasterization workers.

use rustc_hash::FxHashMap;

use pp_core::{Bounds, Coord, LinkId, NodeId};

use crate::{NetworkError, NetworkResult};

// ── Link ──────────────────────────────────────────────────────────────────────

/// One directed road segment and its geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub id: LinkId,
    /// At least one point.  A link loaded from a network file is the
    /// straight segment from its from-node to its to-node.
    pub polyline: Vec<Coord>,
    /// Geometric length of `polyline`, metres.
    pub length_m: f64,
}

impl Link {
    fn new(id: LinkId, polyline: Vec<Coord>) -> Self {
        let length_m = polyline.windows(2).map(|w| w[0].distance(w[1])).sum();
        Self { id, polyline, length_m }
    }
}

// ── LinkNetwork ───────────────────────────────────────────────────────────────

/// Immutable link geometry lookup.
///
/// Do not construct directly; use [`LinkNetworkBuilder`] or
/// [`load_network_xml`](crate::load_network_xml).
pub struct LinkNetwork {
    links:  Vec<Link>,
    index:  FxHashMap<LinkId, usize>,
    bounds: Bounds,
}

impl LinkNetwork {
    /// A network with no links.
    pub fn empty() -> Self {
        LinkNetworkBuilder::new().build()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Look up a link by ID.
    #[inline]
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.index.get(id).map(|&i| &self.links[i])
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All links in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Bounding box of every link polyline.  Empty for an empty network.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

// ── LinkNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`LinkNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use pp_core::Coord;
/// use pp_network::LinkNetworkBuilder;
///
/// let mut b = LinkNetworkBuilder::new();
/// b.add_node("a", Coord::new(0.0, 0.0)).unwrap();
/// b.add_node("b", Coord::new(100.0, 0.0)).unwrap();
/// b.add_link("ab", "a", "b").unwrap();
/// let net = b.build();
/// assert_eq!(net.link("ab").unwrap().length_m, 100.0);
/// ```
pub struct LinkNetworkBuilder {
    nodes: FxHashMap<NodeId, Coord>,
    links: Vec<Link>,
    index: FxHashMap<LinkId, usize>,
}

impl LinkNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            links: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Register a node position for later [`add_link`](Self::add_link) calls.
    pub fn add_node(&mut self, id: impl Into<NodeId>, pos: Coord) -> NetworkResult<()> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(NetworkError::DuplicateNode(id));
        }
        self.nodes.insert(id, pos);
        Ok(())
    }

    /// Add a straight link between two registered nodes.
    pub fn add_link(
        &mut self,
        id:   impl Into<LinkId>,
        from: impl Into<NodeId>,
        to:   impl Into<NodeId>,
    ) -> NetworkResult<()> {
        let id = id.into();
        let from = self.node_pos(&id, from.into())?;
        let to = self.node_pos(&id, to.into())?;
        self.add_polyline(id, vec![from, to])
    }

    /// Add a link with explicit geometry (at least one point).
    pub fn add_polyline(&mut self, id: impl Into<LinkId>, polyline: Vec<Coord>) -> NetworkResult<()> {
        let id = id.into();
        if polyline.is_empty() {
            return Err(NetworkError::EmptyGeometry(id));
        }
        if self.index.contains_key(&id) {
            return Err(NetworkError::DuplicateLink(id));
        }
        self.index.insert(id.clone(), self.links.len());
        self.links.push(Link::new(id, polyline));
        Ok(())
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn link_count(&self) -> usize { self.links.len() }

    pub fn build(self) -> LinkNetwork {
        let bounds = Bounds::from_coords(self.links.iter().flat_map(|l| l.polyline.iter()));
        LinkNetwork {
            links: self.links,
            index: self.index,
            bounds,
        }
    }

    fn node_pos(&self, link: &LinkId, node: NodeId) -> NetworkResult<Coord> {
        self.nodes
            .get(&node)
            .copied()
            .ok_or_else(|| NetworkError::NodeNotFound { link: link.clone(), node })
    }
}

impl Default for LinkNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
