use crate::characteristics::Characteristics;
use crate::node::Node;
use crate::node_id::NodeId;
use crate::runner::ExecMode;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// -------- Pipeline + nodes --------
/// A small graph of plan nodes shared by every [`Stream`](crate::Stream)
/// handle built from the same source.
///
/// Besides nodes and edges it tracks the single-consumption state: which nodes
/// already feed a downstream stage (`linked`), which were evaluated by a
/// terminal operation (`consumed`), and which were built on top of a node that
/// was no longer available (`poisoned`). Violations are reported when a
/// terminal operation plans the chain, never while building it.
pub struct Pipeline {
    pub(crate) inner: Arc<Mutex<PipelineInner>>,
}

pub(crate) struct PlanNode {
    pub node: Node,
    pub characteristics: Characteristics,
}

pub(crate) struct PipelineInner {
    pub next_id: u64,
    pub nodes: HashMap<NodeId, PlanNode>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub linked: HashSet<NodeId>,
    pub consumed: HashSet<NodeId>,
    pub poisoned: HashSet<NodeId>,
    pub mode: ExecMode,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PipelineInner {
                next_id: 0,
                nodes: HashMap::new(),
                edges: Vec::new(),
                linked: HashSet::new(),
                consumed: HashSet::new(),
                poisoned: HashSet::new(),
                mode: ExecMode::Sequential,
            })),
        }
    }
}

/// Allow `Pipeline` cloning; clones share the same graph.
impl Clone for Pipeline {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Pipeline {
    pub(crate) fn lock(&self) -> MutexGuard<'_, PipelineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert_node(&self, node: Node, characteristics: Characteristics) -> NodeId {
        let mut g = self.lock();
        let id = NodeId::new(g.next_id);
        g.next_id += 1;
        g.nodes.insert(
            id,
            PlanNode {
                node,
                characteristics,
            },
        );
        id
    }

    /// Insert `node` downstream of `from`, deriving its characteristics from
    /// the upstream node's.
    pub(crate) fn append<D>(&self, from: NodeId, node: Node, derive: D) -> NodeId
    where
        D: FnOnce(Characteristics) -> Characteristics,
    {
        let upstream = self.characteristics(from);
        let id = self.insert_node(node, derive(upstream));
        self.connect(from, id);
        id
    }

    pub(crate) fn connect(&self, from: NodeId, to: NodeId) {
        let mut g = self.lock();
        if g.linked.contains(&from) || g.consumed.contains(&from) || g.poisoned.contains(&from) {
            debug!(%from, %to, "linking a stream that is already linked or consumed");
            g.poisoned.insert(to);
        }
        g.linked.insert(from);
        g.edges.push((from, to));
    }

    pub(crate) fn poison(&self, id: NodeId) {
        self.lock().poisoned.insert(id);
    }

    pub(crate) fn characteristics(&self, id: NodeId) -> Characteristics {
        self.lock()
            .nodes
            .get(&id)
            .map_or_else(Characteristics::unknown, |n| n.characteristics)
    }

    /// Execution mode used by terminal operations on this pipeline.
    #[must_use]
    pub fn mode(&self) -> ExecMode {
        self.lock().mode
    }

    /// Set the execution mode; the last call before a terminal operation wins.
    pub fn set_mode(&self, mode: ExecMode) {
        self.lock().mode = mode;
    }

    /// Node ids and edges currently in the graph (sorted by id).
    #[must_use]
    pub fn snapshot(&self) -> (Vec<NodeId>, Vec<(NodeId, NodeId)>) {
        let g = self.lock();
        let mut ids: Vec<NodeId> = g.nodes.keys().copied().collect();
        ids.sort();
        (ids, g.edges.clone())
    }
}
