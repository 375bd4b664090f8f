//! The `Undirected` store.
//!
//! Nodes and edges live in sparse id-indexed arenas with a compact list of
//! live ids kept alongside each. The compact lists drive iteration and make
//! deletion O(1) amortized: the deleted entry swaps with the last entry,
//! the moved entry's `index` is fixed up, and the list shrinks by one.

use rustc_hash::FxBuildHasher;
use std::fmt;

use crate::edge::{Edge, EdgeFlags};
use crate::error::{Error, Result};
use crate::node::{Hop, Node};
use crate::traverse::DepthFirst;

type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

/// A container for an undirected graph.
///
/// Node ids and edge ids are independent numbering spaces. Ids freed by
/// deletion are not reused by [`add`](Undirected::add) but may be re-occupied
/// explicitly through [`add_id`](Undirected::add_id).
#[derive(Debug, Clone, Default)]
pub struct Undirected {
    nodes: Vec<Option<Node>>,
    comp_nodes: Vec<usize>,
    edges: Vec<Option<Edge>>,
    comp_edges: Vec<usize>,
}

impl Undirected {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn order(&self) -> usize {
        self.comp_nodes.len()
    }

    /// Number of live edges.
    pub fn size(&self) -> usize {
        self.comp_edges.len()
    }

    /// The next node id [`add`](Undirected::add) would assign. Lower ids may
    /// be free as well if nodes were deleted.
    pub fn next_node_id(&self) -> usize {
        self.nodes.len()
    }

    pub fn next_edge_id(&self) -> usize {
        self.edges.len()
    }

    /// The node with id `id`, if it is live.
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id).and_then(|slot| slot.as_ref())
    }

    /// The edge with id `id`, if it is live.
    pub fn edge(&self, id: usize) -> Option<&Edge> {
        self.edges.get(id).and_then(|slot| slot.as_ref())
    }

    pub fn has_node(&self, id: usize) -> bool {
        self.node(id).is_some()
    }

    /// All live nodes, in compact-list order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.comp_nodes
            .iter()
            .map(|&id| self.nodes[id].as_ref().expect("compact node entry is live"))
    }

    /// All live edges, in compact-list order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.comp_edges
            .iter()
            .map(|&id| self.edges[id].as_ref().expect("compact edge entry is live"))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.comp_nodes.iter().copied()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.comp_edges.iter().copied()
    }

    // Node methods

    /// Adds a node at the next unused id and returns the id.
    pub fn add(&mut self) -> usize {
        let id = self.nodes.len();
        match self.add_id(id) {
            Ok(id) => id,
            Err(_) => unreachable!("next node id is always free"),
        }
    }

    /// Adds a node with id `id`. The sparse arena grows as needed; it never
    /// shrinks. Returns [`Error::NodeExists`] if the id is occupied.
    pub fn add_id(&mut self, id: usize) -> Result<usize> {
        if id < self.nodes.len() && self.nodes[id].is_some() {
            return Err(Error::NodeExists(id));
        }
        if id >= self.nodes.len() {
            self.nodes.resize_with(id + 1, || None);
        }
        self.nodes[id] = Some(Node::new(id, self.comp_nodes.len()));
        self.comp_nodes.push(id);
        Ok(id)
    }

    /// Deletes the node with id `id` along with every edge incident on it.
    ///
    /// Each incident edge is detached from both endpoints' incidence lists
    /// (a self-loop is detached exactly once) and swap-compacted out of the
    /// edge list before the node itself is removed.
    pub fn delete(&mut self, id: usize) -> Result<()> {
        self.check_node(id)?;
        self.delete_node_inner(id);
        Ok(())
    }

    pub fn set_node_name(&mut self, id: usize, name: impl Into<String>) -> Result<()> {
        self.check_node(id)?;
        self.nodes[id].as_mut().expect("checked live").name = Some(name.into());
        Ok(())
    }

    /// Merges node `src` into node `dst`, transferring all of `src`'s edges
    /// to `dst`; edges that joined the pair become self-loops on `dst`. The
    /// node `src` is then deleted. The graph's size is unchanged and its
    /// order decreases by one. Merging a node into itself is a no-op.
    pub fn merge(&mut self, dst: usize, src: usize) -> Result<()> {
        self.check_node(dst)?;
        self.check_node(src)?;
        if dst == src {
            return Ok(());
        }

        let moved = std::mem::take(&mut self.nodes[src].as_mut().expect("checked live").edges);
        for eid in moved {
            let was_on_dst = {
                let e = self.edges[eid].as_mut().expect("incident edge is live");
                let was = e.u == dst || e.v == dst;
                if e.u == src {
                    e.u = dst;
                }
                if e.v == src {
                    e.v = dst;
                }
                was
            };
            // An edge that already touched dst is already listed there; any
            // other edge of src gains exactly one entry in dst's list.
            if !was_on_dst {
                self.nodes[dst].as_mut().expect("checked live").edges.push(eid);
            }
        }

        self.delete_node_inner(src);
        Ok(())
    }

    // Edge methods

    /// Creates an edge joining `u` and `v` with weight `w` and flags `f`,
    /// returning its id. Both nodes must already exist. The edge enters both
    /// incidence lists, or one list once when `u == v`.
    pub fn connect(&mut self, u: usize, v: usize, w: f64, f: EdgeFlags) -> Result<usize> {
        self.check_node(u)?;
        self.check_node(v)?;

        let id = self.edges.len();
        self.insert_edge(id, u, v, w, f);
        Ok(id)
    }

    /// Creates an edge with a caller-chosen id, growing the sparse arena as
    /// needed. Returns [`Error::EdgeExists`] if the id is occupied. Used by
    /// [`subgraph`](Undirected::subgraph) in keep-id mode.
    pub fn connect_keep_id(
        &mut self,
        id: usize,
        u: usize,
        v: usize,
        w: f64,
        f: EdgeFlags,
    ) -> Result<usize> {
        self.check_node(u)?;
        self.check_node(v)?;
        if id < self.edges.len() && self.edges[id].is_some() {
            return Err(Error::EdgeExists(id));
        }

        self.insert_edge(id, u, v, w, f);
        Ok(id)
    }

    /// Deletes the edge with id `id`, detaching it from both endpoints.
    pub fn delete_edge(&mut self, id: usize) -> Result<()> {
        self.check_edge(id)?;
        self.unlink_edge(id, None);
        Ok(())
    }

    pub fn set_edge_weight(&mut self, id: usize, w: f64) -> Result<()> {
        self.check_edge(id)?;
        self.edges[id].as_mut().expect("checked live").weight = w;
        Ok(())
    }

    pub fn set_edge_flags(&mut self, id: usize, f: EdgeFlags) -> Result<()> {
        self.check_edge(id)?;
        self.edges[id].as_mut().expect("checked live").flags = f;
        Ok(())
    }

    pub fn set_edge_name(&mut self, id: usize, name: impl Into<String>) -> Result<()> {
        self.check_edge(id)?;
        self.edges[id].as_mut().expect("checked live").name = Some(name.into());
        Ok(())
    }

    // Structure methods

    /// Whether `u` and `v` share an edge. A node is always connected to
    /// itself. Scans the smaller of the two incidence lists.
    pub fn connected(&self, u: usize, v: usize) -> Result<bool> {
        self.check_node(u)?;
        self.check_node(v)?;

        if u == v {
            return Ok(true);
        }

        let (scan, other) = if self.incidence_len(u) <= self.incidence_len(v) {
            (u, v)
        } else {
            (v, u)
        };
        for &eid in &self.node_ref(scan).edges {
            let e = self.edge_ref(eid);
            if e.u == other || e.v == other {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Ids of the edges shared by `u` and `v`. With `u == v`, only
    /// self-loops are returned.
    pub fn connecting_edges(&self, u: usize, v: usize) -> Result<Vec<usize>> {
        self.check_node(u)?;
        self.check_node(v)?;

        let mut c = Vec::new();
        if u == v {
            for &eid in &self.node_ref(u).edges {
                if self.edge_ref(eid).is_loop() {
                    c.push(eid);
                }
            }
            return Ok(c);
        }

        let (scan, other) = if self.incidence_len(u) <= self.incidence_len(v) {
            (u, v)
        } else {
            (v, u)
        };
        for &eid in &self.node_ref(scan).edges {
            let e = self.edge_ref(eid);
            if e.u == other || e.v == other {
                c.push(eid);
            }
        }
        Ok(c)
    }

    /// Node ids reachable from `id` via edges accepted by `edge_ok`.
    /// Multiply connected neighbors repeat; a self-loop reports the node
    /// itself.
    pub fn neighbors<F>(&self, id: usize, edge_ok: F) -> Result<Vec<usize>>
    where
        F: Fn(&Edge) -> bool,
    {
        self.check_node(id)?;
        Ok(self.neighbor_ids(id, &edge_ok))
    }

    /// Same as [`neighbors`](Undirected::neighbors) with the connecting edge
    /// included.
    pub fn hops<F>(&self, id: usize, edge_ok: F) -> Result<Vec<Hop>>
    where
        F: Fn(&Edge) -> bool,
    {
        self.check_node(id)?;
        let mut hops = Vec::new();
        for &eid in &self.node_ref(id).edges {
            let e = self.edge_ref(eid);
            if edge_ok(e) {
                hops.push(Hop {
                    edge: eid,
                    node: e.opposite(id),
                });
            }
        }
        Ok(hops)
    }

    /// Number of edge ends at the node. A self-loop counts at both ends.
    pub fn degree(&self, id: usize) -> Result<usize> {
        self.check_node(id)?;
        let n = self.node_ref(id);
        let loops = n
            .edges
            .iter()
            .filter(|&&eid| self.edge_ref(eid).is_loop())
            .count();
        Ok(n.edges.len() + loops)
    }

    /// Partitions the live nodes into connected components, one `Vec` of
    /// node ids per component. Connection is determined by traversal of
    /// edges accepted by `edge_ok`.
    pub fn connected_components<F>(&self, edge_ok: F) -> Vec<Vec<usize>>
    where
        F: Fn(&Edge) -> bool,
    {
        let mut df = DepthFirst::new();
        let mut components = Vec::new();
        for &start in &self.comp_nodes {
            if df.visited(start) {
                continue;
            }
            let mut members = Vec::new();
            let _ = df.search(
                self,
                start,
                &edge_ok,
                |n: &Node| {
                    members.push(n.id());
                    false
                },
                None,
            );
            components.push(members);
        }
        components
    }

    /// Builds a standalone graph from the given node subset and all edges
    /// among them. Edges reaching outside the subset pull in the extra
    /// endpoint. With `compact` set, edge ids are renumbered densely;
    /// otherwise the original edge ids are kept, faulting on a collision.
    /// Node ids are preserved either way.
    pub fn subgraph(&self, ids: &[usize], compact: bool) -> Result<Undirected> {
        let mut g = Undirected::new();
        let mut seen: HashSet<usize> = HashSet::default();

        for &id in ids {
            self.check_node(id)?;
            if !g.has_node(id) {
                g.add_id(id)?;
                g.nodes[id].as_mut().expect("just added").name = self.node_ref(id).name.clone();
            }
            for &eid in &self.node_ref(id).edges {
                if !seen.insert(eid) {
                    continue;
                }
                let e = self.edge_ref(eid);
                for nid in [e.u, e.v] {
                    if !g.has_node(nid) {
                        g.add_id(nid)?;
                        g.nodes[nid].as_mut().expect("just added").name =
                            self.node_ref(nid).name.clone();
                    }
                }
                let new_id = if compact {
                    g.connect(e.u, e.v, e.weight, e.flags)?
                } else {
                    g.connect_keep_id(eid, e.u, e.v, e.weight, e.flags)?
                };
                g.edges[new_id].as_mut().expect("just added").name = e.name.clone();
            }
        }

        Ok(g)
    }

    // Internal bookkeeping

    fn check_node(&self, id: usize) -> Result<()> {
        if id >= self.nodes.len() {
            return Err(Error::NodeIdOutOfRange(id));
        }
        if self.nodes[id].is_none() {
            return Err(Error::NodeDoesNotExist(id));
        }
        Ok(())
    }

    fn check_edge(&self, id: usize) -> Result<()> {
        if id >= self.edges.len() || self.edges[id].is_none() {
            return Err(Error::EdgeDoesNotExist(id));
        }
        Ok(())
    }

    fn node_ref(&self, id: usize) -> &Node {
        self.nodes[id].as_ref().expect("node handle is live")
    }

    fn edge_ref(&self, id: usize) -> &Edge {
        self.edges[id].as_ref().expect("edge handle is live")
    }

    fn incidence_len(&self, id: usize) -> usize {
        self.node_ref(id).edges.len()
    }

    pub(crate) fn neighbor_ids<F>(&self, id: usize, edge_ok: &F) -> Vec<usize>
    where
        F: Fn(&Edge) -> bool,
    {
        let mut out = Vec::new();
        for &eid in &self.node_ref(id).edges {
            let e = self.edge_ref(eid);
            if edge_ok(e) {
                out.push(e.opposite(id));
            }
        }
        out
    }

    fn insert_edge(&mut self, id: usize, u: usize, v: usize, w: f64, f: EdgeFlags) {
        if id >= self.edges.len() {
            self.edges.resize_with(id + 1, || None);
        }
        self.edges[id] = Some(Edge {
            id,
            index: self.comp_edges.len(),
            name: None,
            u,
            v,
            weight: w,
            flags: f,
        });
        self.comp_edges.push(id);
        self.nodes[u].as_mut().expect("checked live").edges.push(id);
        if v != u {
            self.nodes[v].as_mut().expect("checked live").edges.push(id);
        }
    }

    fn delete_node_inner(&mut self, id: usize) {
        let incident = std::mem::take(&mut self.nodes[id].as_mut().expect("checked live").edges);
        for eid in incident {
            self.unlink_edge(eid, Some(id));
        }
        let index = self.nodes[id].as_ref().expect("checked live").index;
        self.remove_comp_node(index);
        self.nodes[id] = None;
    }

    /// Detaches an edge from both endpoints' incidence lists (skipping an
    /// endpoint whose own list is being torn down wholesale) and clears its
    /// arena slot. A self-loop is detached exactly once.
    fn unlink_edge(&mut self, eid: usize, skip: Option<usize>) {
        let (u, v, index) = {
            let e = self.edges[eid].as_ref().expect("checked live");
            (e.u, e.v, e.index)
        };
        if Some(u) != skip {
            if let Some(n) = self.nodes[u].as_mut() {
                n.drop_edge(eid);
            }
        }
        if v != u && Some(v) != skip {
            if let Some(n) = self.nodes[v].as_mut() {
                n.drop_edge(eid);
            }
        }
        self.remove_comp_edge(index);
        self.edges[eid] = None;
    }

    fn remove_comp_node(&mut self, index: usize) {
        let last = self.comp_nodes.len() - 1;
        self.comp_nodes.swap(index, last);
        self.comp_nodes.pop();
        if index < self.comp_nodes.len() {
            let moved = self.comp_nodes[index];
            self.nodes[moved].as_mut().expect("compact node entry is live").index = index;
        }
    }

    fn remove_comp_edge(&mut self, index: usize) {
        let last = self.comp_edges.len() - 1;
        self.comp_edges.swap(index, last);
        self.comp_edges.pop();
        if index < self.comp_edges.len() {
            let moved = self.comp_edges[index];
            self.edges[moved].as_mut().expect("compact edge entry is live").index = index;
        }
    }
}

impl fmt::Display for Undirected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G:|V|={} |E|={}", self.order(), self.size())
    }
}
