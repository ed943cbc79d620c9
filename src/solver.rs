//! Adapters that turn normalized sheets and boards into a placement forest.
//!
//! The packing itself is done by the external `packingsolver` program; this
//! module only writes its instance files, runs it once and reads back the
//! solution tree.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{LayoutError, Result};
use crate::forest::Forest;
use crate::types::{BoardRequest, StockSheet};

/// Where `packingsolver` lives when built in-tree with Bazel.
pub const DEFAULT_SOLVER_PATH: &str = "vendor/packingsolver/bazel-bin/packingsolver/main";

const INSTANCE_NAME: &str = "TEST";

pub trait PlacementSolver {
    fn solve(&self, sheets: &[StockSheet], boards: &[BoardRequest]) -> Result<Forest>;
}

impl<F> PlacementSolver for F
where
    F: Fn(&[StockSheet], &[BoardRequest]) -> Result<Forest>,
{
    fn solve(&self, sheets: &[StockSheet], boards: &[BoardRequest]) -> Result<Forest> {
        self(sheets, boards)
    }
}

/// Runs the `packingsolver` binary in rectangle-guillotine mode.
#[derive(Debug, Clone)]
pub struct PackingSolver {
    binary: PathBuf,
    time_limit: u32,
}

impl PackingSolver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            time_limit: 4,
        }
    }

    /// Seconds the solver may search before returning its best solution.
    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit = seconds;
        self
    }

    fn args(&self, dir: &Path) -> Vec<OsString> {
        let prefix = dir.join(INSTANCE_NAME);
        let mut args: Vec<OsString> = vec!["-v".into(), "-p".into(), "RG".into(), "-i".into()];
        args.push(prefix.into_os_string());
        args.push("-c".into());
        args.push(solution_path(dir).into_os_string());
        args.push("-o".into());
        args.push(dir.join(format!("{INSTANCE_NAME}_output.json")).into_os_string());
        args.push("-t".into());
        args.push(self.time_limit.to_string().into());
        for depth in [4, 5] {
            args.push("-q".into());
            args.push("RG -p 3NHO".into());
            args.push("-a".into());
            args.push(format!("IMBA* -c {depth}").into());
        }
        args
    }
}

impl PlacementSolver for PackingSolver {
    fn solve(&self, sheets: &[StockSheet], boards: &[BoardRequest]) -> Result<Forest> {
        if !self.binary.exists() {
            return Err(LayoutError::SolverNotFound {
                path: self.binary.clone(),
            });
        }

        let dir = tempfile::tempdir()?;
        write_instance(dir.path(), sheets, boards)?;

        tracing::info!(
            binary = %self.binary.display(),
            sheets = sheets.len(),
            boards = boards.len(),
            "running packingsolver"
        );
        let output = Command::new(&self.binary).args(self.args(dir.path())).output()?;
        if !output.status.success() {
            return Err(LayoutError::SolverFailure {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let solution = solution_path(dir.path());
        let file = File::open(&solution).map_err(|e| {
            LayoutError::SolverOutput(format!("{}: {e}", solution.display()))
        })?;
        let forest = Forest::from_csv_reader(file)?;
        tracing::info!(nodes = forest.len(), "packingsolver finished");
        Ok(forest)
    }
}

/// Reads a solution CSV produced by an earlier solver run.
#[derive(Debug, Clone)]
pub struct SolutionFile {
    path: PathBuf,
}

impl SolutionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlacementSolver for SolutionFile {
    fn solve(&self, _sheets: &[StockSheet], _boards: &[BoardRequest]) -> Result<Forest> {
        Forest::from_csv_reader(File::open(&self.path)?)
    }
}

fn solution_path(dir: &Path) -> PathBuf {
    dir.join(format!("{INSTANCE_NAME}_solution.csv"))
}

/// Writes `<dir>/TEST_bins.csv` and `<dir>/TEST_items.csv` in scaled units.
pub fn write_instance(dir: &Path, sheets: &[StockSheet], boards: &[BoardRequest]) -> Result<()> {
    let mut bins = csv::Writer::from_path(dir.join(format!("{INSTANCE_NAME}_bins.csv")))?;
    bins.write_record(["ID", "WIDTH", "HEIGHT"])?;
    for sheet in sheets {
        bins.write_record([
            sheet.id.to_string(),
            sheet.scaled_width().to_string(),
            sheet.scaled_height().to_string(),
        ])?;
    }
    bins.flush()?;

    let mut items = csv::Writer::from_path(dir.join(format!("{INSTANCE_NAME}_items.csv")))?;
    items.write_record(["ID", "WIDTH", "HEIGHT", "COPIES"])?;
    for board in boards {
        items.write_record([
            board.id.to_string(),
            board.scaled_width().to_string(),
            board.scaled_height().to_string(),
            board.effective_quantity().to_string(),
        ])?;
    }
    items.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> StockSheet {
        StockSheet {
            id: 0,
            title: None,
            width: 48.75,
            height: 96.75,
            top_margin: 0.0,
            bottom_margin: 0.0,
            x: 3.0,
            y: 3.0,
            nominal_width: 49.0,
            nominal_height: 97.0,
        }
    }

    fn board(quantity: u32, grouped: bool) -> BoardRequest {
        BoardRequest {
            id: 0,
            title: "Side".into(),
            requested_width: 10.0,
            requested_height: 20.0,
            quantity,
            grouped,
            padded_width: 10.375,
            padded_height: if grouped { 20.375 * quantity as f64 } else { 20.375 },
            placed: false,
        }
    }

    #[test]
    fn test_write_instance() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), &[sheet()], &[board(3, false)]).unwrap();

        let bins = std::fs::read_to_string(dir.path().join("TEST_bins.csv")).unwrap();
        assert_eq!(bins, "ID,WIDTH,HEIGHT\n0,48750,96750\n");
        let items = std::fs::read_to_string(dir.path().join("TEST_items.csv")).unwrap();
        assert_eq!(items, "ID,WIDTH,HEIGHT,COPIES\n0,10375,20375,3\n");
    }

    #[test]
    fn test_grouped_board_sent_as_one_copy() {
        let dir = tempfile::tempdir().unwrap();
        write_instance(dir.path(), &[sheet()], &[board(3, true)]).unwrap();
        let items = std::fs::read_to_string(dir.path().join("TEST_items.csv")).unwrap();
        assert_eq!(items, "ID,WIDTH,HEIGHT,COPIES\n0,10375,61125,1\n");
    }

    #[test]
    fn test_command_line() {
        let solver = PackingSolver::new("/opt/packingsolver").with_time_limit(9);
        let dir = Path::new("/tmp/run");
        let args: Vec<String> = solver
            .args(dir)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-v",
                "-p",
                "RG",
                "-i",
                "/tmp/run/TEST",
                "-c",
                "/tmp/run/TEST_solution.csv",
                "-o",
                "/tmp/run/TEST_output.json",
                "-t",
                "9",
                "-q",
                "RG -p 3NHO",
                "-a",
                "IMBA* -c 4",
                "-q",
                "RG -p 3NHO",
                "-a",
                "IMBA* -c 5",
            ]
        );
    }

    #[test]
    fn test_missing_binary() {
        let solver = PackingSolver::new("/nonexistent/packingsolver");
        let err = solver.solve(&[sheet()], &[board(1, false)]).unwrap_err();
        assert!(matches!(err, LayoutError::SolverNotFound { .. }));
    }

    #[cfg(unix)]
    fn fake_solver(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("packingsolver");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_solver_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_solver(dir.path(), "echo 'no feasible solution' >&2\nexit 3");
        let err = PackingSolver::new(bin)
            .solve(&[sheet()], &[board(1, false)])
            .unwrap_err();
        match err {
            LayoutError::SolverFailure { stderr, .. } => {
                assert!(stderr.contains("no feasible solution"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_solver_output_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let script = r#"while [ $# -gt 0 ]; do
  if [ "$1" = "-c" ]; then out="$2"; fi
  shift
done
printf 'PLATE_ID,NODE_ID,X,Y,WIDTH,HEIGHT,TYPE,CUT,PARENT\n0,0,0,0,10375,20375,0,0,\n' > "$out""#;
        let bin = fake_solver(dir.path(), script);
        let forest = PackingSolver::new(bin)
            .solve(&[sheet()], &[board(1, false)])
            .unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.get(0).unwrap().type_id, Some(0));
    }

    #[test]
    fn test_solution_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution.csv");
        std::fs::write(
            &path,
            "PLATE_ID,NODE_ID,X,Y,WIDTH,HEIGHT,TYPE,CUT,PARENT\n0,0,0,0,100,100,-2,0,\n",
        )
        .unwrap();
        let forest = SolutionFile::new(&path).solve(&[], &[]).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.get(0).unwrap().type_id, None);
    }
}
