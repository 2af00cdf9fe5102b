use algoviz::{
    app::{Algorithm, Config, EditTool, Mode, Session, SpeedControl},
    grid::{CellType, GridEvent},
    solvers::{SearchState, Solver},
    sorting::{ArrayEvent, Sorter},
};

const MAX_TICKS: usize = 100_000;

fn config() -> Config {
    Config {
        seed: Some(1234),
        array_len: 20,
        ..Config::default()
    }
}

fn tick_until_idle(session: &mut Session) -> usize {
    let mut ticks = 0;
    while (session.is_playing() || session.is_generating_maze()) && ticks < MAX_TICKS {
        session.tick(SpeedControl::FRAME);
        ticks += 1;
    }
    ticks
}

#[test]
fn test_default_grid_covers_the_canvas() {
    let session = Session::new(Config::default(), None, None);
    assert_eq!(session.grid().rows(), 27);
    assert_eq!(session.grid().cols(), 49);
    assert_eq!(session.mode(), Mode::Sorting);
    assert_eq!(session.algorithm(), None);
}

#[test]
fn test_every_sorter_plays_to_completion() {
    let mut session = Session::new(config(), None, None);
    let original = session.array().values().to_vec();
    let mut expected = original.clone();
    expected.sort();

    for sorter in Sorter::ALL {
        session.select_algorithm(Algorithm::Sort(sorter));
        // Selecting restores the generated array
        assert_eq!(session.array().values(), original.as_slice());
        session.speed_mut().set_speed(SpeedControl::MAX);
        session.toggle_play();
        assert!(session.is_playing());
        tick_until_idle(&mut session);

        assert_eq!(session.array().values(), expected.as_slice(), "{}", sorter);
        assert_eq!(session.status(), "Sorting complete!");
        assert!(session.sort_engine(sorter).is_sorted());

        // A finished run does not start again
        session.toggle_play();
        assert!(!session.is_playing());
    }
}

#[test]
fn test_step_once_advances_one_operation() {
    let mut session = Session::new(config(), None, None);
    session.select_algorithm(Algorithm::Sort(Sorter::Bubble));
    session.step_once();
    assert_eq!(session.sort_engine(Sorter::Bubble).stats().comparisons, 1);
    session.step_once();
    assert_eq!(session.sort_engine(Sorter::Bubble).stats().comparisons, 2);
    assert!(!session.is_playing());

    // Reset puts the array back and rearms the engine
    let before = session.array().values().to_vec();
    session.reset();
    assert_eq!(session.sort_engine(Sorter::Bubble).stats().comparisons, 0);
    assert_eq!(session.array().len(), before.len());
}

#[test]
fn test_slow_speed_waits_between_steps() {
    let mut session = Session::new(config(), None, None);
    session.select_algorithm(Algorithm::Sort(Sorter::Selection));
    session.speed_mut().set_speed(0.5);
    session.toggle_play();
    session.tick(SpeedControl::FRAME);
    assert_eq!(session.sort_engine(Sorter::Selection).stats().comparisons, 0);
    session.tick(SpeedControl::FRAME);
    assert_eq!(session.sort_engine(Sorter::Selection).stats().comparisons, 1);
}

#[test]
fn test_array_size_is_clamped() {
    let mut session = Session::new(config(), None, None);
    session.set_array_len(1000);
    assert_eq!(session.array().len(), 100);
    session.set_array_len(0);
    assert_eq!(session.array().len(), 10);
}

#[test]
fn test_search_needs_both_endpoints() {
    let mut session = Session::new(config(), None, None);
    session.select_algorithm(Algorithm::Search(Solver::Bfs));
    assert_eq!(session.mode(), Mode::Pathfinding);
    assert!(session.edit_cell((2, 2), EditTool::Endpoint));
    session.toggle_play();
    assert!(!session.is_playing());
    assert_eq!(session.status(), "Place both Start and End nodes!");
}

#[test]
fn test_search_plays_to_completion() {
    let mut session = Session::new(config(), None, None);
    session.select_algorithm(Algorithm::Search(Solver::AStar));
    assert!(session.edit_cell((0, 0), EditTool::Endpoint));
    assert!(session.edit_cell((0, 5), EditTool::Endpoint));
    session.toggle_play();
    assert!(session.is_playing());
    // Cells cannot be edited mid-run
    assert!(!session.edit_cell((5, 5), EditTool::Wall));
    tick_until_idle(&mut session);

    let progress = session.search_engine(Solver::AStar).progress();
    assert_eq!(progress.state(), SearchState::Found);
    assert_eq!(progress.path_cost, 5);
    assert_eq!(session.status(), "Path found!");
    assert_eq!(session.grid().count(CellType::Path), 4);

    // A new run starts from a clean overlay
    session.select_algorithm(Algorithm::Search(Solver::Bfs));
    assert_eq!(session.grid().count(CellType::Path), 0);
    session.toggle_play();
    tick_until_idle(&mut session);
    assert_eq!(session.search_engine(Solver::Bfs).progress().path_cost, 5);
}

#[test]
fn test_blocked_search_reports_no_path() {
    let mut session = Session::new(config(), None, None);
    session.select_algorithm(Algorithm::Search(Solver::Dijkstra));
    session.edit_cell((0, 0), EditTool::Endpoint);
    session.edit_cell((3, 3), EditTool::Endpoint);
    session.edit_cell((0, 1), EditTool::Wall);
    session.edit_cell((1, 0), EditTool::Wall);
    session.edit_cell((1, 1), EditTool::Wall);
    session.toggle_play();
    tick_until_idle(&mut session);
    assert_eq!(session.status(), "No path found!");

    session.clear_walls();
    assert_eq!(session.grid().count(CellType::Wall), 0);
    session.toggle_play();
    tick_until_idle(&mut session);
    assert_eq!(session.status(), "Path found!");
}

#[test]
fn test_edit_during_paused_search_restarts_it() {
    let mut session = Session::new(Config::default(), None, None);
    session.select_algorithm(Algorithm::Search(Solver::Dijkstra));
    session.edit_cell((5, 5), EditTool::Endpoint);
    session.edit_cell((5, 20), EditTool::Endpoint);
    session.step_once();
    assert_eq!(
        session.search_engine(Solver::Dijkstra).progress().state(),
        SearchState::Searching
    );

    // (5, 6) is already on the frontier
    assert!(session.edit_cell((5, 6), EditTool::Wall));
    assert_eq!(
        session.search_engine(Solver::Dijkstra).progress().state(),
        SearchState::Idle
    );
    assert_eq!(session.grid().count(CellType::Visited), 0);

    session.toggle_play();
    tick_until_idle(&mut session);
    assert_eq!(session.status(), "Path found!");
    assert_eq!(session.grid()[(5, 6)].kind, CellType::Wall);
    assert_eq!(session.grid().count(CellType::Wall), 1);
    assert_eq!(session.search_engine(Solver::Dijkstra).progress().path_cost, 17);
}

#[test]
fn test_maze_generation_through_ticks() {
    let mut session = Session::new(config(), None, None);
    session.set_mode(Mode::Pathfinding);
    session.generate_maze();
    assert!(session.is_generating_maze());
    tick_until_idle(&mut session);

    assert_eq!(session.status(), "Maze generated. Place Start/End.");
    assert_eq!(session.grid().count(CellType::Visited), 0);
    assert!(session.grid().count(CellType::Wall) > 0);
    assert!(session.grid().count(CellType::Empty) > 0);
    assert_eq!(session.grid()[(0, 0)].kind, CellType::Empty);

    session.clear_maze();
    assert_eq!(session.grid().count(CellType::Wall), 0);
}

#[test]
fn test_same_seed_same_session() {
    let a = Session::new(config(), None, None);
    let b = Session::new(config(), None, None);
    assert_eq!(a.array().values(), b.array().values());
}

#[test]
fn test_switching_mode_clears_the_grid() {
    let mut session = Session::new(config(), None, None);
    session.select_algorithm(Algorithm::Search(Solver::Bfs));
    session.edit_cell((0, 0), EditTool::Endpoint);
    session.edit_cell((1, 1), EditTool::Wall);
    session.set_mode(Mode::Sorting);
    assert_eq!(session.grid().start(), None);
    assert_eq!(session.grid().count(CellType::Wall), 0);
    assert_eq!(session.algorithm(), None);
    // Grid edits are ignored outside pathfinding
    assert!(!session.edit_cell((0, 0), EditTool::Endpoint));
}

#[test]
fn test_events_reach_the_channels() {
    let (array_tx, array_rx) = std::sync::mpsc::channel();
    let (grid_tx, grid_rx) = std::sync::mpsc::channel();
    let mut session = Session::new(config(), Some(array_tx), Some(grid_tx));

    assert!(matches!(
        array_rx.try_recv(),
        Ok(ArrayEvent::Initial { values }) if values.len() == 20
    ));
    assert!(matches!(
        grid_rx.try_recv(),
        Ok(GridEvent::Initial { rows: 27, cols: 49, .. })
    ));

    session.select_algorithm(Algorithm::Search(Solver::Bfs));
    session.edit_cell((4, 4), EditTool::Wall);
    let updates = grid_rx.try_iter().collect::<Vec<_>>();
    assert_eq!(
        updates.last(),
        Some(&GridEvent::Update {
            coord: (4, 4),
            old: CellType::Empty,
            new: CellType::Wall
        })
    );
}

#[test]
fn test_resize_grid_only_while_idle() {
    let (grid_tx, grid_rx) = std::sync::mpsc::channel();
    let mut session = Session::new(config(), None, Some(grid_tx));
    session.resize_grid(210, 105);
    assert_eq!((session.grid().rows(), session.grid().cols()), (5, 10));
    assert!(grid_rx.try_iter().any(|event| event
        == GridEvent::Initial {
            rows: 5,
            cols: 10,
            cell: CellType::Empty
        }));

    session.select_algorithm(Algorithm::Search(Solver::Bfs));
    session.edit_cell((0, 0), EditTool::Endpoint);
    session.edit_cell((4, 9), EditTool::Endpoint);
    session.toggle_play();
    assert!(session.is_playing());
    session.resize_grid(1029, 567);
    assert_eq!(session.grid().cols(), 10);
}
