//! Reconciles the solver's placement forest with the sheets and board
//! requests, producing the draw instructions for the cut diagram.
//!
//! Every node is compared against its parent: a side that coincides with the
//! parent's side was already cut further up the tree, any other side is a new
//! cut. Leaves without a board are waste.

use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::draw::{DrawInstruction, format_inches};
use crate::error::{LayoutError, Result};
use crate::expander::{self, Placed};
use crate::forest::{Forest, PlacementNode};
use crate::types::{BoardRequest, Rect, StockSheet, to_inches};

/// Which sides of a node are new cuts rather than inherited from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewEdges {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl NewEdges {
    pub fn classify(node: &Rect, parent: &Rect) -> Self {
        Self {
            left: node.x != parent.x,
            top: node.y != parent.y,
            right: node.right() != parent.right(),
            bottom: node.bottom() != parent.bottom(),
        }
    }

    pub fn count(&self) -> usize {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .filter(|&&e| e)
            .count()
    }
}

/// A cut segment in scaled sheet coordinates, used to draw shared boundaries once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Segment {
    plate: usize,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
}

/// What a node turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Board(usize),
    Waste,
    Split,
}

pub struct Reconciler<'a> {
    sheets: &'a [StockSheet],
    forest: &'a Forest,
    config: &'a LayoutConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(sheets: &'a [StockSheet], forest: &'a Forest, config: &'a LayoutConfig) -> Self {
        Self {
            sheets,
            forest,
            config,
        }
    }

    /// Produces the draw instructions for the whole layout and marks every
    /// request that received a node as placed.
    pub fn run(&self, boards: &mut [BoardRequest]) -> Result<Vec<DrawInstruction>> {
        let mut out = Vec::new();
        for sheet in self.sheets {
            self.emit_stock(sheet, &mut out);
        }

        let has_children = self.forest.child_flags();
        let mut drawn = HashSet::new();

        for node in self.forest.nodes() {
            let sheet = self
                .sheets
                .get(node.plate_id)
                .ok_or(LayoutError::UnknownPlate {
                    node: node.id,
                    plate: node.plate_id,
                })?;
            let role = classify(node, boards, has_children[node.id]);
            tracing::debug!(
                node = node.id,
                plate = node.plate_id,
                rect = %node.rect,
                ?role,
                "reconcile node"
            );

            if !matches!(role, NodeRole::Board(_)) || self.config.outline_boards {
                let parent = self.parent_rect(node, sheet);
                self.emit_cuts(node, &parent, sheet, &mut drawn, &mut out);
            }

            let (ox, oy) = sheet.origin();
            let at = Placed {
                x: to_inches(node.rect.x) + ox,
                y: to_inches(node.rect.y) + oy,
                width: to_inches(node.rect.w),
                height: to_inches(node.rect.h),
            };

            match role {
                NodeRole::Board(idx) => {
                    let request = &mut boards[idx];
                    request.placed = true;
                    out.extend(expander::expand(request, at, self.config.leading_divider));
                }
                NodeRole::Waste => out.push(DrawInstruction::WasteRect {
                    x: at.x,
                    y: at.y,
                    width: at.width,
                    height: at.height,
                }),
                NodeRole::Split => {}
            }
        }

        Ok(out)
    }

    fn parent_rect(&self, node: &PlacementNode, sheet: &StockSheet) -> Rect {
        match node.parent.and_then(|p| self.forest.get(p)) {
            Some(parent) => parent.rect,
            None => sheet.root_rect(),
        }
    }

    fn emit_cuts(
        &self,
        node: &PlacementNode,
        parent: &Rect,
        sheet: &StockSheet,
        drawn: &mut HashSet<Segment>,
        out: &mut Vec<DrawInstruction>,
    ) {
        let r = node.rect;
        let edges = NewEdges::classify(&r, parent);
        tracing::trace!(node = node.id, new_edges = edges.count(), "classified edges");
        let candidates = [
            (edges.left, (r.x, r.y, r.x, r.bottom())),
            (edges.top, (r.x, r.y, r.right(), r.y)),
            (edges.right, (r.right(), r.y, r.right(), r.bottom())),
            (edges.bottom, (r.x, r.bottom(), r.right(), r.bottom())),
        ];

        let (ox, oy) = sheet.origin();
        for (is_new, (x1, y1, x2, y2)) in candidates {
            if !is_new {
                continue;
            }
            let segment = Segment {
                plate: node.plate_id,
                x1,
                y1,
                x2,
                y2,
            };
            if !drawn.insert(segment) {
                continue;
            }
            out.push(DrawInstruction::CutLine {
                x1: to_inches(x1) + ox,
                y1: to_inches(y1) + oy,
                x2: to_inches(x2) + ox,
                y2: to_inches(y2) + oy,
            });
        }
    }

    fn emit_stock(&self, sheet: &StockSheet, out: &mut Vec<DrawInstruction>) {
        let height = sheet.outline_height();
        let center_x = sheet.x + sheet.width / 2.0;

        out.push(DrawInstruction::StockOutline {
            x: sheet.x,
            y: sheet.y,
            width: sheet.width,
            height,
        });
        if sheet.top_margin > 0.0 {
            out.push(DrawInstruction::MarginLabel {
                text: format!("{}\"", format_inches(sheet.top_margin)),
                x: center_x,
                y: sheet.y + sheet.top_margin / 2.0,
            });
        }
        if sheet.bottom_margin > 0.0 {
            out.push(DrawInstruction::MarginLabel {
                text: format!("{}\"", format_inches(sheet.bottom_margin)),
                x: center_x,
                y: sheet.y + height - sheet.bottom_margin / 2.0,
            });
        }

        let size = format!(
            "{}x{}",
            format_inches(sheet.nominal_height),
            format_inches(sheet.nominal_width)
        );
        let text = match &sheet.title {
            Some(title) => format!("{title}\n{size}"),
            None => size,
        };
        out.push(DrawInstruction::StockCaption {
            text,
            x: center_x,
            y: sheet.y + height + 1.5,
        });
    }
}

/// Decides whether a node is a board, waste, or an intermediate split.
///
/// A type id that does not name a request is treated like no type at all.
fn classify(node: &PlacementNode, boards: &[BoardRequest], has_children: bool) -> NodeRole {
    match node.type_id.filter(|&t| t < boards.len()) {
        Some(idx) => NodeRole::Board(idx),
        None if has_children => NodeRole::Split,
        None => NodeRole::Waste,
    }
}
