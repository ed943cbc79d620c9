use serde::Serialize;

/// Abstract drawing operations produced by the engine, in absolute layout inches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawInstruction {
    StockOutline {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Title and nominal size printed under a sheet.
    StockCaption { text: String, x: f64, y: f64 },
    MarginLabel { text: String, x: f64, y: f64 },
    CutLine { x1: f64, y1: f64, x2: f64, y2: f64 },
    WasteRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    BoardLabel {
        text: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    DividerLine { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl DrawInstruction {
    /// Right and bottom extent of the instruction, used to size canvases.
    pub fn extent(&self) -> (f64, f64) {
        match self {
            DrawInstruction::StockOutline {
                x,
                y,
                width,
                height,
            }
            | DrawInstruction::WasteRect {
                x,
                y,
                width,
                height,
            }
            | DrawInstruction::BoardLabel {
                x,
                y,
                width,
                height,
                ..
            } => (x + width, y + height),
            DrawInstruction::StockCaption { x, y, .. }
            | DrawInstruction::MarginLabel { x, y, .. } => (*x, *y),
            DrawInstruction::CutLine { x1, y1, x2, y2 }
            | DrawInstruction::DividerLine { x1, y1, x2, y2 } => (x1.max(*x2), y1.max(*y2)),
        }
    }

    pub fn is_cut(&self) -> bool {
        matches!(self, DrawInstruction::CutLine { .. })
    }

    pub fn is_waste(&self) -> bool {
        matches!(self, DrawInstruction::WasteRect { .. })
    }

    pub fn is_board_label(&self) -> bool {
        matches!(self, DrawInstruction::BoardLabel { .. })
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, DrawInstruction::DividerLine { .. })
    }
}

/// Formats a length the way it is printed on the diagram (`20.125`, `10`).
pub fn format_inches(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

/// Board label text: the title followed by the board's size.
///
/// Narrow boards get the size on the same line so the rotated label stays short.
pub fn board_label_text(title: &str, height: f64, width: f64) -> String {
    let dims = format!("{} x {}\"", format_inches(height), format_inches(width));
    if width > 3.0 {
        format!("{title}\n{dims}")
    } else {
        format!("{title} - {dims}")
    }
}
