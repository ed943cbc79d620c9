use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_KERF: f64 = 0.125;
pub const DEFAULT_BOARD_WASTE: f64 = 0.125;
pub const DEFAULT_STOCK_WASTE: f64 = 0.125;

/// Layout settings, read from `config.json` and overridable from the command line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Full saw kerf in inches.
    pub kerf: f64,
    /// Allowance added around every board for jointing.
    pub board_waste: f64,
    /// Allowance removed from every sheet edge for squaring.
    pub stock_waste: f64,
    /// Pack all copies of a board as one contiguous region.
    pub group_multiple_boards: bool,
    /// Draw the first divider of a grouped board even though it sits on the board's top edge.
    pub leading_divider: bool,
    /// Emit cut lines for the new edges of placed boards too.
    pub outline_boards: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            kerf: DEFAULT_KERF,
            board_waste: DEFAULT_BOARD_WASTE,
            stock_waste: DEFAULT_STOCK_WASTE,
            group_multiple_boards: false,
            leading_divider: true,
            outline_boards: false,
        }
    }
}

impl LayoutConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Padding for the normalizer. Each board edge takes half a kerf, so two
    /// neighbouring boards are separated by one full kerf.
    pub fn padding(&self) -> Padding {
        Padding {
            half_kerf: self.kerf / 2.0,
            board_waste: self.board_waste,
            stock_waste: self.stock_waste,
            group_multiple_boards: self.group_multiple_boards,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub half_kerf: f64,
    pub board_waste: f64,
    pub stock_waste: f64,
    pub group_multiple_boards: bool,
}
