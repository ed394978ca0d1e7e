//! CFG type definitions.

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::statement::{StatementKind, StatementLine};

/// Unique identifier for a basic block: its ordinal position in document
/// order. Displayed as `B0`, `B1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// A maximal straight-line run of statements with one entry and one exit.
///
/// Blocks partition the statement stream exactly: no gaps, no overlaps,
/// ordered by start index. They never merge or split after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Block identifier (ordinal position).
    pub id: BlockId,
    /// First statement index (inclusive).
    pub start: usize,
    /// Last statement index (exclusive).
    pub end: usize,
    /// The statements this block spans.
    pub statements: Vec<StatementLine>,
}

impl BasicBlock {
    /// Stable name derived from the ordinal position (`B0`, `B1`, ...).
    #[inline]
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    /// The statement that decides this block's outgoing control flow.
    ///
    /// Only the last statement is consulted when synthesizing edges; earlier
    /// statements in a block are assumed not to affect control.
    #[inline]
    pub fn last_kind(&self) -> Option<StatementKind> {
        self.statements.last().map(|s| s.kind)
    }

    /// Whether any statement in the block is a `case`/`default` label.
    #[inline]
    pub fn contains_case_label(&self) -> bool {
        self.statements
            .iter()
            .any(|s| s.kind == StatementKind::CaseLabel)
    }
}

/// Semantic type of a CFG edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Unlabeled edge: sequential fall-through or switch dispatch.
    Sequential,
    /// True branch of a conditional.
    True,
    /// False branch of a conditional.
    False,
    /// Loop header to loop body.
    LoopBody,
    /// Loop body back to its header.
    BackEdge,
}

impl EdgeType {
    /// Display label for this edge type (empty for unlabeled edges).
    pub fn default_label(&self) -> &'static str {
        match self {
            EdgeType::Sequential => "",
            EdgeType::True => "true",
            EdgeType::False => "false",
            EdgeType::LoopBody => "loop-body",
            EdgeType::BackEdge => "back-edge",
        }
    }
}

/// A directed edge in the control flow graph.
///
/// Multiple edges between the same ordered pair with different types are
/// permitted (a branch edge commonly coexists with the sequential edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgEdge {
    /// Source block.
    pub from: BlockId,
    /// Target block.
    pub to: BlockId,
    /// Semantic edge type.
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl CfgEdge {
    /// Create a new unlabeled (sequential/dispatch) edge.
    #[inline]
    pub fn sequential(from: BlockId, to: BlockId) -> Self {
        Self {
            from,
            to,
            edge_type: EdgeType::Sequential,
        }
    }

    /// Create a new edge with a specific type.
    #[inline]
    pub fn new(from: BlockId, to: BlockId, edge_type: EdgeType) -> Self {
        Self {
            from,
            to,
            edge_type,
        }
    }
}

/// Cached adjacency lists for O(degree) successor/predecessor lookups.
///
/// Built lazily on first access. Internal implementation detail of [`Cfg`].
#[derive(Debug)]
pub struct AdjacencyCache {
    successors: FxHashMap<BlockId, Vec<BlockId>>,
    predecessors: FxHashMap<BlockId, Vec<BlockId>>,
}

/// Control flow graph over the basic blocks of one source file.
///
/// Blocks are kept in document order; every block remains a node even if no
/// edge reaches it (no isolated-node pruning). The graph is not required to
/// be acyclic: loop back-edges introduce cycles by design.
#[derive(Debug, Serialize, Deserialize)]
pub struct Cfg {
    /// All blocks, in document order. `blocks[i].id == BlockId(i)`.
    pub blocks: Vec<BasicBlock>,
    /// All edges, in construction order.
    pub edges: Vec<CfgEdge>,
    /// Lazily built adjacency cache. Rebuilt on demand after deserialization.
    #[serde(skip)]
    adjacency_cache: OnceCell<AdjacencyCache>,
}

impl Clone for Cfg {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks.clone(),
            edges: self.edges.clone(),
            // Rebuilt lazily if needed.
            adjacency_cache: OnceCell::new(),
        }
    }
}

impl Cfg {
    /// Create a CFG from its blocks and edges.
    #[must_use]
    pub fn new(blocks: Vec<BasicBlock>, edges: Vec<CfgEdge>) -> Self {
        Self {
            blocks,
            edges,
            adjacency_cache: OnceCell::new(),
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Block ids in document order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().map(|b| b.id)
    }

    fn build_adjacency(&self) -> AdjacencyCache {
        let mut successors: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        let mut predecessors: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();

        for edge in &self.edges {
            successors.entry(edge.from).or_default().push(edge.to);
            predecessors.entry(edge.to).or_default().push(edge.from);
        }

        AdjacencyCache {
            successors,
            predecessors,
        }
    }

    #[inline]
    fn adjacency(&self) -> &AdjacencyCache {
        self.adjacency_cache.get_or_init(|| self.build_adjacency())
    }

    /// Successors of a block (outgoing edges, labels ignored).
    ///
    /// First call builds the O(E) cache; subsequent calls are O(out-degree).
    pub fn successors(&self, block: BlockId) -> &[BlockId] {
        self.adjacency()
            .successors
            .get(&block)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Predecessors of a block (incoming edges, labels ignored).
    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.adjacency()
            .predecessors
            .get(&block)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
