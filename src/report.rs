use serde::Serialize;

use crate::types::BoardRequest;

/// A requested board the solver did not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnplacedBoard {
    pub index: usize,
    pub title: String,
}

impl std::fmt::Display for UnplacedBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to place board {}: {}", self.index, self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlacementReport {
    pub unplaced: Vec<UnplacedBoard>,
}

impl PlacementReport {
    pub fn collect(boards: &[BoardRequest]) -> Self {
        let unplaced = boards
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.placed)
            .map(|(index, b)| UnplacedBoard {
                index,
                title: b.title.clone(),
            })
            .collect();
        Self { unplaced }
    }

    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn log(&self) {
        for board in &self.unplaced {
            tracing::warn!(index = board.index, title = %board.title, "board was not placed");
        }
    }
}
