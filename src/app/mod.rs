mod config;
mod history;
mod renderer;
mod session;

pub use config::Config;
pub use history::EventHistory;
pub use session::{Algorithm, EditTool, Mode, Session, SpeedControl};

use std::{
    io::{Stdout, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, Sender},
    },
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode, KeyModifiers, MouseButton, MouseEventKind},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    app::renderer::Renderer,
    grid::{CellType, GridEvent},
    sorting::ArrayEvent,
};

enum UserInputEvent {
    KeyPress(event::KeyEvent),
    Mouse(event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UserActionEvent {
    /// Start or pause the selected algorithm
    TogglePlay,
    /// Step the log forward, or run one step when not browsing
    Forward,
    /// Step backward in the operation log when paused
    Backward,
    /// Increase animation speed
    SpeedUp,
    /// Decrease animation speed
    SlowDown,
    /// Switch between sorting and pathfinding
    SwitchMode,
    /// Select the next algorithm of the current mode
    NextAlgorithm,
    NewArray,
    GrowArray,
    ShrinkArray,
    Reset,
    GenerateMaze,
    ClearPath,
    ClearWalls,
    ClearWeights,
    ClearMaze,
    ToggleDiagonal,
    /// Apply a tool to the cell under the terminal position (column, row)
    Edit(u16, u16, EditTool),
    /// Terminal resize
    Resize,
    Quit,
}

pub struct App {
    /// Duration of one frame of the main loop
    frame_time: Duration,
    /// Timeout for polling input events in the input thread, a.k.a.
    /// how often to check for the quit flag
    user_input_event_poll_timeout: Duration,
    /// Maximum number of operations kept in the log for browsing when paused
    max_history_events: usize,
}

impl Default for App {
    fn default() -> Self {
        Self {
            frame_time: SpeedControl::FRAME,
            user_input_event_poll_timeout: Duration::from_millis(50),
            max_history_events: 1000,
        }
    }
}

impl App {
    /// Modes offered in the first menu
    const MODES: [Mode; 2] = [Mode::Sorting, Mode::Pathfinding];
    /// Number of bars the size keys add or remove
    const ARRAY_LEN_INCREMENT: usize = 10;
    /// Frames a headless run may take before it is abandoned
    const MAX_PROFILE_TICKS: usize = 1_000_000;

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode, enter alternate screen and capture the mouse
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        crossterm::queue!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(
            stdout,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Main application loop
    pub fn run(&self, stdout: &mut Stdout, mut config: Config) -> std::io::Result<()> {
        let mode = match App::select_from_menu(
            stdout,
            "Select a mode (use arrow keys and Enter, or Esc to exit):",
            &App::MODES,
        )? {
            Some(mode) => mode,
            None => return Ok(()),
        };

        if mode == Mode::Sorting {
            match App::ask_array_len(stdout, config.array_len)? {
                Some(len) => config.array_len = len,
                None => return Ok(()),
            }
        }

        let algorithm = match App::select_from_menu(
            stdout,
            "Select an algorithm (use arrow keys and Enter, or Esc to exit):",
            &Algorithm::all(mode),
        )? {
            Some(algorithm) => {
                stdout.execute(style::PrintStyledContent(
                    format!("Selected algorithm: {}\r\n", algorithm)
                        .with(Color::Green)
                        .attribute(Attribute::Bold),
                ))?;
                algorithm
            }
            None => return Ok(()),
        };

        queue!(
            stdout,
            style::PrintStyledContent(
                "Controls:\r\n"
                    .with(Color::Yellow)
                    .attribute(Attribute::Bold)
            ),
            style::PrintStyledContent("  Enter: Play/Pause\r\n".with(Color::Cyan)),
            style::PrintStyledContent(
                "  ←/→: Browse the operation log when paused, → steps once\r\n".with(Color::Cyan)
            ),
            style::PrintStyledContent("  ↑/↓: Speed up/slow down animation\r\n".with(Color::Cyan)),
            style::PrintStyledContent("  Tab: Switch mode, a: Next algorithm\r\n".with(Color::Cyan)),
            style::PrintStyledContent(
                "  Mouse: click Start/End, right click Wall, ctrl+click Weight\r\n"
                    .with(Color::Cyan)
            ),
            style::PrintStyledContent("  Esc: Exit\r\n".with(Color::Cyan)),
            style::Print(format!("  {}\r\n\r\n", legend())),
        )?;
        stdout.flush()?;
        match App::select_from_menu(stdout, "Ready?", &["Start", "Exit"])? {
            Some("Start") => {}
            _ => return Ok(()),
        }

        let (array_event_tx, array_event_rx) = std::sync::mpsc::channel::<ArrayEvent>();
        let (grid_event_tx, grid_event_rx) = std::sync::mpsc::channel::<GridEvent>();
        let mut session = Session::new(config, Some(array_event_tx), Some(grid_event_tx));
        session.select_algorithm(algorithm);

        // Flag to tell the input thread to stop. Set by the main thread on exit.
        let quit = Arc::new(AtomicBool::new(false));
        let (user_input_event_tx, user_input_event_rx) =
            std::sync::mpsc::channel::<UserInputEvent>();
        let user_input_event_poll_timeout = self.user_input_event_poll_timeout;
        let quit_for_input = quit.clone();
        // Spawn a thread to listen for user input
        let input_thread_handle = std::thread::spawn(move || -> std::io::Result<()> {
            App::listen_to_user_input(
                user_input_event_tx,
                user_input_event_poll_timeout,
                &quit_for_input,
            )
        });

        let mut renderer = Renderer::new(self.max_history_events);
        stdout.execute(terminal::Clear(ClearType::All))?;
        let result = self.app_loop(
            &mut session,
            &mut renderer,
            &user_input_event_rx,
            &grid_event_rx,
            &array_event_rx,
        );

        quit.store(true, Ordering::Relaxed);
        drop(user_input_event_rx);
        // Wait for input thread to finish
        match input_thread_handle.join() {
            Ok(Err(e)) => tracing::warn!("Input thread failed: {}", e),
            Err(_) => tracing::error!("Input thread panicked"),
            Ok(Ok(())) => {}
        }
        result
    }

    /// Runs every algorithm headless, as fast as the session allows, and logs
    /// how long each one took
    pub fn profile(&self, config: Config, iterations: usize) -> std::io::Result<()> {
        let mut session = Session::new(config, None, None);
        for _ in 0..iterations {
            for mode in App::MODES {
                for algorithm in Algorithm::all(mode) {
                    let started = Instant::now();
                    let ticks = App::profile_run(&mut session, algorithm);
                    tracing::info!(
                        "[profile] {} finished in {} ticks, {:?}: {}",
                        algorithm,
                        ticks,
                        started.elapsed(),
                        session.status()
                    );
                }
            }
        }
        Ok(())
    }

    /// One headless run of `algorithm`. Pathfinding runs on a fresh maze with
    /// the endpoints in opposite corners. Returns the number of ticks taken.
    fn profile_run(session: &mut Session, algorithm: Algorithm) -> usize {
        session.select_algorithm(algorithm);
        session.speed_mut().set_speed(SpeedControl::MAX);
        let mut ticks = 0;

        match algorithm {
            Algorithm::Sort(_) => session.randomize_array(),
            Algorithm::Search(_) => {
                session.reset();
                session.generate_maze();
                while session.is_generating_maze() && ticks < App::MAX_PROFILE_TICKS {
                    session.tick(SpeedControl::FRAME);
                    ticks += 1;
                }
                // Cells with two even coordinates are always carved
                let last_row = (session.grid().rows().saturating_sub(1) / 2) * 2;
                let last_col = (session.grid().cols().saturating_sub(1) / 2) * 2;
                session.edit_cell((0, 0), EditTool::Endpoint);
                session.edit_cell((last_row, last_col), EditTool::Endpoint);
            }
        }

        session.toggle_play();
        while session.is_playing() && ticks < App::MAX_PROFILE_TICKS {
            session.tick(SpeedControl::FRAME);
            ticks += 1;
        }
        ticks
    }

    /// Frame loop: apply user input, advance the session, then draw
    fn app_loop(
        &self,
        session: &mut Session,
        renderer: &mut Renderer,
        user_input_event_rx: &Receiver<UserInputEvent>,
        grid_event_rx: &Receiver<GridEvent>,
        array_event_rx: &Receiver<ArrayEvent>,
    ) -> std::io::Result<()> {
        tracing::info!("Started main app loop");
        let mut last_tick = Instant::now();
        loop {
            let frame_start = Instant::now();

            // Handle every input received since the last frame
            loop {
                let input_event = match user_input_event_rx.try_recv() {
                    Ok(event) => event,
                    Err(std::sync::mpsc::TryRecvError::Empty) => break,
                    Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                        tracing::info!("Input thread has exited");
                        return Ok(());
                    }
                };
                let Some(action) = App::map_input(session, renderer, input_event) else {
                    continue;
                };
                tracing::debug!("[app loop] {:?}", action);
                if action == UserActionEvent::Quit {
                    tracing::info!("Exiting main app loop");
                    return Ok(());
                }
                App::apply_action(session, renderer, action);
            }

            let now = Instant::now();
            session.tick(now - last_tick);
            last_tick = now;

            renderer.drain_events(session.mode(), grid_event_rx, array_event_rx)?;
            renderer.draw(session)?;

            if let Some(remaining) = self.frame_time.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    /// Translate a raw input event into an action, given what the session is doing
    fn map_input(
        session: &Session,
        renderer: &Renderer,
        input_event: UserInputEvent,
    ) -> Option<UserActionEvent> {
        let paused = !session.is_playing();
        match input_event {
            UserInputEvent::KeyPress(key_event) => match key_event.code {
                KeyCode::Esc => Some(UserActionEvent::Quit),
                KeyCode::Enter | KeyCode::Char(' ') => Some(UserActionEvent::TogglePlay),
                KeyCode::Left if paused => Some(UserActionEvent::Backward),
                KeyCode::Right if paused => Some(UserActionEvent::Forward),
                KeyCode::Up => Some(UserActionEvent::SpeedUp),
                KeyCode::Down => Some(UserActionEvent::SlowDown),
                KeyCode::Tab => Some(UserActionEvent::SwitchMode),
                KeyCode::Char('a') => Some(UserActionEvent::NextAlgorithm),
                KeyCode::Char('r') => Some(UserActionEvent::Reset),
                KeyCode::Char('n') if session.mode() == Mode::Sorting => {
                    Some(UserActionEvent::NewArray)
                }
                KeyCode::Char('+') | KeyCode::Char('=') if session.mode() == Mode::Sorting => {
                    Some(UserActionEvent::GrowArray)
                }
                KeyCode::Char('-') if session.mode() == Mode::Sorting => {
                    Some(UserActionEvent::ShrinkArray)
                }
                KeyCode::Char(c) if session.mode() == Mode::Pathfinding => match c {
                    'g' => Some(UserActionEvent::GenerateMaze),
                    'c' => Some(UserActionEvent::ClearPath),
                    'w' => Some(UserActionEvent::ClearWalls),
                    'x' => Some(UserActionEvent::ClearWeights),
                    'z' => Some(UserActionEvent::ClearMaze),
                    'd' => Some(UserActionEvent::ToggleDiagonal),
                    _ => None,
                },
                _ => None, // Ignore other keys
            },
            UserInputEvent::Mouse(mouse_event) => {
                let tool = match mouse_event.kind {
                    MouseEventKind::Down(MouseButton::Left)
                        if mouse_event.modifiers.contains(KeyModifiers::CONTROL) =>
                    {
                        EditTool::Weight
                    }
                    MouseEventKind::Down(MouseButton::Left)
                        if mouse_event.modifiers.contains(KeyModifiers::SHIFT) =>
                    {
                        EditTool::Wall
                    }
                    MouseEventKind::Down(MouseButton::Left) => EditTool::Endpoint,
                    // Dragging paints walls
                    MouseEventKind::Down(MouseButton::Right)
                    | MouseEventKind::Drag(MouseButton::Right)
                    | MouseEventKind::Drag(MouseButton::Left) => EditTool::Wall,
                    MouseEventKind::Down(MouseButton::Middle) => EditTool::Weight,
                    _ => return None,
                };
                renderer
                    .cell_at(mouse_event.column, mouse_event.row)
                    .map(|_| UserActionEvent::Edit(mouse_event.column, mouse_event.row, tool))
            }
            UserInputEvent::Resize => Some(UserActionEvent::Resize),
        }
    }

    fn apply_action(session: &mut Session, renderer: &mut Renderer, action: UserActionEvent) {
        match action {
            UserActionEvent::TogglePlay => session.toggle_play(),
            UserActionEvent::Forward => {
                // Leave the log before stepping into the future
                if !renderer.history_forward() {
                    session.step_once();
                }
            }
            UserActionEvent::Backward => {
                renderer.history_backward();
            }
            UserActionEvent::SpeedUp => session.speed_mut().faster(),
            UserActionEvent::SlowDown => session.speed_mut().slower(),
            UserActionEvent::SwitchMode => {
                let mode = match session.mode() {
                    Mode::Sorting => Mode::Pathfinding,
                    Mode::Pathfinding => Mode::Sorting,
                };
                session.set_mode(mode);
            }
            UserActionEvent::NextAlgorithm => {
                let algorithms = Algorithm::all(session.mode());
                let next = match session
                    .algorithm()
                    .and_then(|current| algorithms.iter().position(|&a| a == current))
                {
                    Some(i) => algorithms[(i + 1) % algorithms.len()],
                    None => algorithms[0],
                };
                session.select_algorithm(next);
            }
            UserActionEvent::NewArray => session.randomize_array(),
            UserActionEvent::GrowArray => {
                let len = session.config().array_len + App::ARRAY_LEN_INCREMENT;
                session.set_array_len(len);
            }
            UserActionEvent::ShrinkArray => {
                let len = session
                    .config()
                    .array_len
                    .saturating_sub(App::ARRAY_LEN_INCREMENT);
                session.set_array_len(len);
            }
            UserActionEvent::Reset => session.reset(),
            UserActionEvent::GenerateMaze => session.generate_maze(),
            UserActionEvent::ClearPath => session.clear_path(),
            UserActionEvent::ClearWalls => session.clear_walls(),
            UserActionEvent::ClearWeights => session.clear_weights(),
            UserActionEvent::ClearMaze => session.clear_maze(),
            UserActionEvent::ToggleDiagonal => session.toggle_diagonal(),
            UserActionEvent::Edit(column, row, tool) => {
                if let Some(coord) = renderer.cell_at(column, row) {
                    session.edit_cell(coord, tool);
                }
            }
            UserActionEvent::Resize => renderer.invalidate(),
            UserActionEvent::Quit => {}
        }
    }

    /// Listen for user input events (key presses, mouse and resize)
    /// This function runs in a separate thread, and is the only place where user input is read
    fn listen_to_user_input(
        user_input_event_tx: Sender<UserInputEvent>,
        event_poll_timeout: Duration,
        quit: &AtomicBool,
    ) -> std::io::Result<()> {
        loop {
            if quit.load(Ordering::Relaxed) {
                return Ok(());
            }

            // Poll for events with a timeout
            if !event::poll(event_poll_timeout)? {
                // No event available, continue loop to check the flag again
                continue;
            }

            let input_event = match event::read()? {
                event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                    UserInputEvent::KeyPress(key_event)
                }
                event::Event::Mouse(mouse_event) => UserInputEvent::Mouse(mouse_event),
                event::Event::Resize(_, _) => UserInputEvent::Resize,
                _ => continue, // Ignore other events
            };

            // Should exit input thread on Esc key
            let should_exit = matches!(
                input_event,
                UserInputEvent::KeyPress(event::KeyEvent {
                    code: KeyCode::Esc,
                    ..
                })
            );

            // Send the input event to the main thread
            if user_input_event_tx.send(input_event).is_err() {
                // Receiver has been dropped, exit the thread
                return Ok(());
            }

            if should_exit {
                tracing::debug!("[input loop] Esc key pressed, exiting");
                return Ok(());
            }
        }
    }

    /// Get user input with real-time validation and feedback
    /// Returns None if user cancels input with Esc
    /// Returns Some(T) if user inputs a valid input and presses Enter, where T is the validated type
    fn prompt_with_validation<F, T>(
        stdout: &mut Stdout,
        prompt: &str,
        validate: F,
    ) -> std::io::Result<Option<T>>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        // Save cursor position so we can restore / redraw
        queue!(stdout, cursor::Hide, cursor::SavePosition)?;
        stdout.flush()?;

        let mut input = String::new();

        let value = loop {
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;

            stdout.queue(style::PrintStyledContent(
                prompt.with(Color::Cyan).attribute(Attribute::Bold),
            ))?;

            // Decide color based on validity
            let validation_result = validate(input.trim());
            match validation_result {
                Ok(_) => stdout.queue(style::SetForegroundColor(Color::Green))?,
                Err(_) => stdout.queue(style::SetForegroundColor(Color::Red))?,
            };

            queue!(stdout, style::Print(&input), style::ResetColor)?;
            stdout.queue(style::Print(" \r\n"))?;

            if let Err(msg) = validation_result {
                stdout.queue(style::PrintStyledContent(
                    msg.with(Color::DarkGrey).attribute(Attribute::Dim),
                ))?;
            }

            stdout.flush()?;

            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Enter => match validate(input.trim()) {
                        Ok(value) => break Some(value),
                        Err(_) => continue,
                    },
                    KeyCode::Char(c) => {
                        if !c.is_whitespace() && !c.is_control() {
                            input.push(c);
                        }
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Esc => break None,
                    _ => {}
                }
            }
        };
        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;

        Ok(value)
    }

    /// Ask for the number of bars. An empty answer keeps `default`.
    fn ask_array_len(stdout: &mut Stdout, default: usize) -> std::io::Result<Option<usize>> {
        let (min, max) = (*Config::ARRAY_LEN_RANGE.start(), *Config::ARRAY_LEN_RANGE.end());
        // One column per bar at least, leave room for the panels
        let max = match terminal::size() {
            Ok((term_width, _)) => max.min(term_width as usize).max(min),
            Err(_) => max,
        };
        let validate = |s: &str| {
            if s.is_empty() {
                return Ok(default.clamp(min, max));
            }
            let error_msg = format!("Please enter a number between {} and {}.", min, max);
            s.parse::<usize>()
                .map_err(|_| error_msg.clone())
                .and_then(|n| if (min..=max).contains(&n) { Ok(n) } else { Err(error_msg) })
        };

        let len = App::prompt_with_validation(stdout, "Number of bars: ", validate)?;
        if let Some(len) = len {
            stdout.execute(style::PrintStyledContent(
                format!("Array size set to {}\r\n", len)
                    .with(Color::Green)
                    .attribute(Attribute::Bold),
            ))?;
        }
        Ok(len)
    }

    /// Present a menu of options to the user and let them select one using arrow keys
    /// Returns None if user cancels input with Esc
    /// Returns Some(T) if user selects an option and presses Enter, where T is the option type
    fn select_from_menu<T: std::fmt::Display + Copy>(
        stdout: &mut Stdout,
        prompt: &str,
        options: &[T],
    ) -> std::io::Result<Option<T>> {
        if options.is_empty() {
            return Ok(None);
        }

        queue!(stdout, cursor::Hide, cursor::SavePosition)?;

        let mut selected = 0;

        let selected_option = loop {
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;

            stdout.queue(style::PrintStyledContent(prompt.with(Color::Yellow)))?;

            for (i, option) in options.iter().enumerate() {
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::Reverse))?;
                }
                stdout.queue(style::Print(format!("\r\n{}", option)))?;
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::NoReverse))?;
                }
            }
            stdout.queue(style::Print("\r\n"))?;

            stdout.flush()?;

            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Up => {
                        selected = match selected {
                            0 => options.len() - 1,
                            _ => selected - 1,
                        };
                    }
                    KeyCode::Down => {
                        selected = (selected + 1) % options.len();
                    }
                    KeyCode::Enter => break Some(options[selected]),
                    KeyCode::Esc => break None,
                    _ => {}
                }
            }
        };
        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;

        Ok(selected_option)
    }
}

/// Cell symbol legend shown with the controls.
fn legend() -> String {
    [
        (CellType::Start, "start"),
        (CellType::End, "end"),
        (CellType::Wall, "wall"),
        (CellType::Weight, "weight"),
        (CellType::Visited, "visited"),
        (CellType::Path, "path"),
    ]
    .iter()
    .map(|(kind, name)| format!("{} {}", kind, name))
    .collect::<Vec<_>>()
    .join("  ")
}
