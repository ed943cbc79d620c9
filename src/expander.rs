use crate::draw::{DrawInstruction, board_label_text};
use crate::types::BoardRequest;

/// Absolute position and size of a placed node, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placed {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Emits the labels for one placed board.
///
/// A grouped request with several copies occupies one region stacked along
/// the height axis; it is split into `quantity` equal labels separated by
/// divider lines. `leading_divider` controls the divider at the top edge of
/// the first copy.
pub fn expand(request: &BoardRequest, at: Placed, leading_divider: bool) -> Vec<DrawInstruction> {
    if request.quantity <= 1 || !request.grouped {
        return vec![DrawInstruction::BoardLabel {
            text: board_label_text(&request.title, at.height, at.width),
            x: at.x,
            y: at.y,
            width: at.width,
            height: at.height,
        }];
    }

    let copies = request.quantity as usize;
    let partial_height = at.height / request.quantity as f64;
    let mut out = Vec::with_capacity(copies * 2);

    for i in 0..copies {
        let title = format!("{} #{i}", request.title);
        out.push(DrawInstruction::BoardLabel {
            text: board_label_text(&title, partial_height, at.width),
            x: at.x,
            y: at.y + i as f64 * partial_height,
            width: at.width,
            height: partial_height,
        });
    }

    let first = if leading_divider { 0 } else { 1 };
    for i in first..copies {
        let y = at.y + i as f64 * partial_height;
        out.push(DrawInstruction::DividerLine {
            x1: at.x,
            y1: y,
            x2: at.x + at.width,
            y2: y,
        });
    }

    out
}
