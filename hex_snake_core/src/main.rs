// hexpath: headless demo of the hex snake pathfinding core.
//
// Builds a grid from a JSON config (or the defaults), walls off a random
// fraction of cells, then searches from one random open cell to another and
// reports the route.
//
// Usage:
//   cargo run -p hex_snake_core --bin hexpath -- [config.json] [--seed N] [--walls FRACTION]
//
// Set RUST_LOG=debug (or trace) for the core's own diagnostics.

use hex_snake_core::prng::SnakeRng;
use hex_snake_core::{CellId, CellState, GridConfig, GridError, HexGrid, HexMap, find_path};
use std::process::ExitCode;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = args.first().filter(|a| !a.starts_with("--"));
    let seed: u64 = parse_flag(&args, "--seed").unwrap_or(0);
    let walls: f64 = parse_flag(&args, "--walls").unwrap_or(0.2);

    let config = match config_path {
        Some(path) => match GridConfig::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                error!(%path, %err, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => GridConfig::default(),
    };

    let mut grid = match HexGrid::from_config(&config) {
        Ok(grid) => grid,
        Err(err) => {
            error!(%err, "could not build grid");
            return ExitCode::FAILURE;
        }
    };
    info!(
        radius = grid.radius(),
        cells = grid.cell_count(),
        index_nodes = grid.index().node_count(),
        "grid ready"
    );

    let mut rng = SnakeRng::new(seed);
    let (blocked, endpoints) = match place_walls_and_goal(&mut grid, &mut rng, walls) {
        Ok(setup) => setup,
        Err(err) => {
            error!(%err, "could not set up the map");
            return ExitCode::FAILURE;
        }
    };
    let Some((start, goal)) = endpoints else {
        warn!(blocked, "no open cells left to search between");
        return ExitCode::FAILURE;
    };

    match find_path(&grid, start, goal) {
        Ok(path) => {
            info!(
                %start,
                %goal,
                steps = path.len(),
                expanded = path.expanded,
                blocked,
                "path found"
            );
            for id in &path.cells {
                if let Some(cell) = grid.cell(*id) {
                    let world = grid.axis_to_world(cell.r(), cell.q());
                    info!(coord = %cell.coord(), x = world.x, y = world.y, "step");
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!(%err, blocked, "search failed");
            ExitCode::FAILURE
        }
    }
}

/// Block each cell with probability `walls`, then pick a start and mark a
/// goal among the open cells. Returns the wall count and the endpoints, if
/// any cell is left open.
fn place_walls_and_goal(
    grid: &mut HexGrid,
    rng: &mut SnakeRng,
    walls: f64,
) -> Result<(usize, Option<(CellId, CellId)>), GridError> {
    let ids: Vec<CellId> = grid.cells().map(|c| c.id()).collect();
    for id in ids {
        if rng.chance(walls) {
            grid.set_state(id, CellState::Blocked)?;
        }
    }
    let blocked = grid.take_dirty().len();

    let (Some(start), Some(goal)) = (
        grid.random_traversable_cell(rng),
        grid.random_traversable_cell(rng),
    ) else {
        return Ok((blocked, None));
    };
    grid.set_state(goal, CellState::Marked)?;
    Ok((blocked, Some((start, goal))))
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
