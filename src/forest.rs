//! The solver's placement tree, stored as an arena indexed by node id.

use std::io::Read;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::error::{LayoutError, Result};
use crate::types::Rect;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementNode {
    pub id: NodeId,
    /// `None` when the node hangs directly off its stock sheet.
    pub parent: Option<NodeId>,
    pub plate_id: usize,
    /// Index of the board request this node places, if any.
    pub type_id: Option<usize>,
    pub rect: Rect,
}

/// All placement nodes of one solver run. `nodes[i].id == i` always holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    nodes: Vec<PlacementNode>,
}

impl Forest {
    /// Builds a forest from nodes in any order.
    ///
    /// Ids must cover `0..n` exactly and every parent must exist.
    pub fn new(mut nodes: Vec<PlacementNode>) -> Result<Self> {
        nodes.sort_by_key(|n| n.id);
        for (idx, node) in nodes.iter().enumerate() {
            if node.id != idx {
                return Err(LayoutError::SolverOutput(format!(
                    "node ids are not contiguous: expected {idx}, found {}",
                    node.id
                )));
            }
        }
        for node in &nodes {
            if let Some(parent) = node.parent
                && (parent >= nodes.len() || parent == node.id)
            {
                return Err(LayoutError::DanglingParent {
                    node: node.id,
                    parent,
                });
            }
            if let Some(parent) = node.parent.map(|p| &nodes[p])
                && !parent.rect.contains(&node.rect)
            {
                tracing::warn!(
                    node = node.id,
                    parent = parent.id,
                    "node extends outside its parent"
                );
            }
        }
        Ok(Self { nodes })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut nodes = Vec::new();
        for result in rdr.deserialize::<SolutionRecord>() {
            nodes.push(result?.into_node()?);
        }
        Self::new(nodes)
    }

    pub fn get(&self, id: NodeId) -> Option<&PlacementNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[PlacementNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// One flag per node, true when some other node names it as parent.
    pub fn child_flags(&self) -> Vec<bool> {
        let mut flags = vec![false; self.nodes.len()];
        for node in &self.nodes {
            if let Some(parent) = node.parent {
                flags[parent] = true;
            }
        }
        flags
    }
}

/// A row of packingsolver's solution CSV.
#[derive(Debug, Deserialize)]
struct SolutionRecord {
    #[serde(rename = "PLATE_ID")]
    plate_id: usize,
    #[serde(rename = "NODE_ID")]
    node_id: usize,
    #[serde(rename = "X")]
    x: i64,
    #[serde(rename = "Y")]
    y: i64,
    #[serde(rename = "WIDTH")]
    width: i64,
    #[serde(rename = "HEIGHT")]
    height: i64,
    #[serde(rename = "TYPE", default)]
    kind: Option<i64>,
    #[serde(rename = "PARENT", default)]
    parent: Option<String>,
}

impl SolutionRecord {
    fn into_node(self) -> Result<PlacementNode> {
        let parent = match self.parent.as_deref().map(str::trim) {
            None | Some("") | Some("-1") => None,
            Some(raw) => Some(raw.parse::<NodeId>().map_err(|_| {
                LayoutError::AmbiguousParentReference {
                    node: self.node_id,
                    raw: raw.to_string(),
                }
            })?),
        };
        // Negative types mark leftovers and intermediate cuts.
        let type_id = self.kind.and_then(|t| usize::try_from(t).ok());

        Ok(PlacementNode {
            id: self.node_id,
            parent,
            plate_id: self.plate_id,
            type_id,
            rect: Rect::new(self.x, self.y, self.width, self.height),
        })
    }
}
