use std::path::PathBuf;

use clap::Parser;
use cutlayout::LayoutConfig;
use cutlayout::input;
use cutlayout::render;
use cutlayout::solver::{DEFAULT_SOLVER_PATH, PackingSolver, PlacementSolver, SolutionFile};
use cutlayout::svg;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "cutlayout",
    about = "Annotated cut diagrams for sheet goods"
)]
struct Cli {
    /// Folder containing boards.csv, stock.csv and optionally config.json
    input: PathBuf,

    /// Saw kerf in inches (default: 0.125)
    #[arg(long)]
    kerf: Option<f64>,

    /// Extra material around each board in inches (default: 0.125)
    #[arg(long)]
    board_waste: Option<f64>,

    /// Material trimmed from each sheet edge in inches (default: 0.125)
    #[arg(long)]
    stock_waste: Option<f64>,

    /// Lay out all copies of a board together
    #[arg(long, conflicts_with = "no_group_multiple_boards")]
    group_multiple_boards: bool,

    /// Place copies of a board individually, even if config.json groups them
    #[arg(long)]
    no_group_multiple_boards: bool,

    /// Skip the divider on the top edge of grouped boards
    #[arg(long)]
    no_leading_divider: bool,

    /// Also draw cut lines around placed boards
    #[arg(long)]
    outline_boards: bool,

    /// Write the SVG here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Path to the packingsolver binary
    #[arg(long, default_value = DEFAULT_SOLVER_PATH)]
    solver: PathBuf,

    /// Seconds packingsolver may search
    #[arg(long, default_value_t = 4)]
    time_limit: u32,

    /// Render an existing packingsolver solution CSV instead of solving
    #[arg(long)]
    solution: Option<PathBuf>,

    /// Print an ASCII preview of the layout to stderr
    #[arg(long)]
    preview: bool,

    /// Log every node as it is reconciled
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    /// Flags override config.json, which overrides the defaults.
    fn merge_config(&self, file: Option<LayoutConfig>) -> LayoutConfig {
        let mut config = file.unwrap_or_default();
        if let Some(kerf) = self.kerf {
            config.kerf = kerf;
        }
        if let Some(board_waste) = self.board_waste {
            config.board_waste = board_waste;
        }
        if let Some(stock_waste) = self.stock_waste {
            config.stock_waste = stock_waste;
        }
        if self.group_multiple_boards {
            config.group_multiple_boards = true;
        }
        if self.no_group_multiple_boards {
            config.group_multiple_boards = false;
        }
        if self.no_leading_divider {
            config.leading_divider = false;
        }
        if self.outline_boards {
            config.outline_boards = true;
        }
        config
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let input = input::load_dir(&cli.input).unwrap_or_else(|e| fail(e));
    let config = cli.merge_config(input.config);

    let solver: Box<dyn PlacementSolver> = match &cli.solution {
        Some(path) => Box::new(SolutionFile::new(path)),
        None => Box::new(PackingSolver::new(&cli.solver).with_time_limit(cli.time_limit)),
    };

    let plan = cutlayout::plan(&input.stock, &input.boards, &config, solver.as_ref())
        .unwrap_or_else(|e| fail(e));

    if !plan.report.all_placed() {
        eprintln!("Some boards did not fit on the available stock:");
        for board in &plan.report.unplaced {
            eprintln!("{}", board);
        }
    }

    if cli.preview {
        eprint!("{}", render::render_preview(&plan.instructions));
    }

    let document = svg::render_svg(&plan.instructions);
    match &cli.output {
        Some(path) => {
            std::fs::write(path, document).unwrap_or_else(|e| fail(e));
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", document),
    }

    eprintln!(
        "Summary: {} sheet{} used, {:.1}% waste, {} board{} unplaced",
        plan.sheet_count(),
        if plan.sheet_count() == 1 { "" } else { "s" },
        plan.waste_percent(),
        plan.report.unplaced.len(),
        if plan.report.unplaced.len() == 1 { "" } else { "s" },
    );
}
