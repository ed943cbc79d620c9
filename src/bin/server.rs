use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use cutlayout::draw::DrawInstruction;
use cutlayout::report::UnplacedBoard;
use cutlayout::solver::{DEFAULT_SOLVER_PATH, PackingSolver};
use cutlayout::types::{BoardRow, StockRow};
use cutlayout::{LayoutConfig, LayoutError, svg};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
struct AppState {
    solver: PackingSolver,
}

#[derive(Deserialize, Serialize)]
struct LayoutRequest {
    stock: Vec<StockRow>,
    boards: Vec<BoardRow>,
    #[serde(default)]
    config: LayoutConfig,
}

#[derive(Serialize)]
struct LayoutResponse {
    svg: String,
    instructions: Vec<DrawInstruction>,
    unplaced: Vec<UnplacedBoard>,
    sheet_count: usize,
    waste_percent: f64,
}

fn error_response(e: LayoutError) -> (StatusCode, String) {
    let status = match &e {
        e if e.is_input_error() => StatusCode::BAD_REQUEST,
        LayoutError::SolverNotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    tracing::error!(%status, error = %e, "layout failed");
    (status, e.to_string())
}

async fn layout(
    State(state): State<AppState>,
    Json(req): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /layout"
    );

    if req.stock.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "at least one stock sheet is required".to_string(),
        ));
    }

    // The solver is a blocking child process.
    let plan = tokio::task::spawn_blocking(move || {
        cutlayout::plan(&req.stock, &req.boards, &req.config, &state.solver)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(error_response)?;

    let response = LayoutResponse {
        svg: svg::render_svg(&plan.instructions),
        sheet_count: plan.sheet_count(),
        waste_percent: plan.waste_percent(),
        unplaced: plan.report.unplaced,
        instructions: plan.instructions,
    };

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let solver_path =
        std::env::var("PACKINGSOLVER_BIN").unwrap_or_else(|_| DEFAULT_SOLVER_PATH.to_string());
    let state = AppState {
        solver: PackingSolver::new(solver_path),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/layout", post(layout))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
