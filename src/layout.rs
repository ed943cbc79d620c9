use crate::config::LayoutConfig;
use crate::draw::DrawInstruction;
use crate::engine::Reconciler;
use crate::error::Result;
use crate::normalize::normalize;
use crate::report::PlacementReport;
use crate::solver::PlacementSolver;
use crate::types::{BoardRequest, BoardRow, StockRow, StockSheet};

/// Result of one complete layout run.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    pub sheets: Vec<StockSheet>,
    pub boards: Vec<BoardRequest>,
    pub instructions: Vec<DrawInstruction>,
    pub report: PlacementReport,
    /// One flag per sheet, set when the solver put at least one node on it.
    pub sheets_in_use: Vec<bool>,
}

impl LayoutPlan {
    pub fn sheet_count(&self) -> usize {
        self.sheets_in_use.iter().filter(|&&used| used).count()
    }

    /// Waste area as a percentage of the usable area of the sheets in use.
    pub fn waste_percent(&self) -> f64 {
        let stock_area: f64 = self
            .sheets
            .iter()
            .zip(&self.sheets_in_use)
            .filter(|(_, used)| **used)
            .map(|(s, _)| s.width * s.height)
            .sum();
        if stock_area == 0.0 {
            return 0.0;
        }
        let waste_area: f64 = self
            .instructions
            .iter()
            .filter_map(|i| match i {
                DrawInstruction::WasteRect { width, height, .. } => Some(width * height),
                _ => None,
            })
            .sum();
        waste_area / stock_area * 100.0
    }
}

/// Normalizes the input, runs the solver once and reconciles its forest.
///
/// Invalid input fails before the solver is started. Boards the solver could
/// not place are listed in the report rather than failing the run.
pub fn plan(
    stock: &[StockRow],
    boards: &[BoardRow],
    config: &LayoutConfig,
    solver: &dyn PlacementSolver,
) -> Result<LayoutPlan> {
    let (sheets, mut boards) = normalize(stock, boards, &config.padding())?;
    tracing::info!(sheets = sheets.len(), boards = boards.len(), "normalized input");

    let forest = solver.solve(&sheets, &boards)?;
    let instructions = Reconciler::new(&sheets, &forest, config).run(&mut boards)?;
    let report = PlacementReport::collect(&boards);
    report.log();

    let mut sheets_in_use = vec![false; sheets.len()];
    for node in forest.nodes() {
        if let Some(used) = sheets_in_use.get_mut(node.plate_id) {
            *used = true;
        }
    }

    tracing::info!(
        nodes = forest.len(),
        instructions = instructions.len(),
        unplaced = report.unplaced.len(),
        "layout complete"
    );
    Ok(LayoutPlan {
        sheets,
        boards,
        instructions,
        report,
        sheets_in_use,
    })
}
