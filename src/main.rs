use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use labyrinth_rust::agents::{
    run_episode, EpisodeOutcome, Greedy, RandomWalk, Strategy, WallFollower,
};
use labyrinth_rust::mazegen;
use labyrinth_rust::playback::{PlaybackAgent, Recording};
use labyrinth_rust::simulation::environment::GridEnvironment;
use labyrinth_rust::simulation::params::DEFAULT_STEP_BUDGET;
use labyrinth_rust::simulation::tile::{Position, TargetDescriptor};
use labyrinth_rust::telemetry::LogSink;
use labyrinth_rust::ui;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentKind {
    WallFollower,
    Greedy,
    RandomWalk,
}

impl AgentKind {
    fn build(self) -> Box<dyn Strategy> {
        match self {
            Self::WallFollower => Box::new(WallFollower::new()),
            Self::Greedy => Box::new(Greedy::new()),
            Self::RandomWalk => Box::new(RandomWalk::new()),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid labyrinth simulation CLI")]
struct Cli {
    /// Navigation strategy to run
    #[arg(long, value_enum)]
    agent: Option<AgentKind>,

    /// Labyrinth file: layout rows plus optional `Starting Point:` and
    /// `Goal:` lines
    #[arg(long)]
    labyrinth: Option<PathBuf>,

    /// Generate a random labyrinth instead, e.g. `15x22`
    #[arg(long)]
    generate: Option<String>,

    /// Replay a recorded episode
    #[arg(long)]
    playback: Option<PathBuf>,

    /// Write an episode record per run
    #[arg(long)]
    log: bool,

    /// Directory episode records are written into
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Number of episodes to run
    #[arg(long, default_value_t = 1)]
    repeats: u32,

    /// View radius of the agent (unlimited when omitted)
    #[arg(long)]
    view_radius: Option<i32>,

    /// Radius in which target identities are discernible (always when
    /// omitted)
    #[arg(long)]
    target_radius: Option<i32>,

    /// Watch the run in the terminal
    #[arg(long)]
    show: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    if let Some(path) = cli.playback.clone() {
        run_playback(&cli, &path)?;
    } else if cli.agent.is_some() {
        run_agent(&cli)?;
    } else {
        return Err("either a strategy via --agent or a recording via --playback is required".into());
    }

    LogSink::global().flush();
    Ok(())
}

/// Loads or generates the world, returning the layout plus start and goal.
fn load_world(cli: &Cli) -> Result<(String, Position, Position), Box<dyn Error>> {
    if let Some(dimensions) = &cli.generate {
        let (rows, cols) = parse_dimensions(dimensions)?;
        let mut rng = StdRng::from_os_rng();
        let maze = mazegen::generate(rows, cols, &mut rng)?;
        info!(rows, cols, "generated labyrinth");
        return Ok((maze.layout, maze.start, maze.goal));
    }
    let Some(path) = &cli.labyrinth else {
        return Err("a labyrinth is required: pass --labyrinth FILE or --generate RxC".into());
    };
    let text = fs::read_to_string(path)?;
    let (layout, start, goal) = mazegen::parse_maze_file(&text)?;
    let env = GridEnvironment::new(&layout)?;
    let (fallback_start, fallback_goal) = fallback_endpoints(&env);
    let start = start
        .or(fallback_start)
        .ok_or("labyrinth has no passable tiles")?;
    let goal = goal.or(fallback_goal).ok_or("labyrinth has no passable tiles")?;
    Ok((layout, start, goal))
}

/// First and last passable tile in row-major order, used when a labyrinth
/// file carries no start/goal markers.
fn fallback_endpoints(env: &GridEnvironment) -> (Option<Position>, Option<Position>) {
    let mut first = None;
    let mut last = None;
    for i in 0..env.size.0 {
        for j in 0..env.size.1 {
            if env.tile((i, j)).is_some_and(|t| t.is_passable()) {
                if first.is_none() {
                    first = Some((i, j));
                }
                last = Some((i, j));
            }
        }
    }
    (first, last)
}

fn parse_dimensions(text: &str) -> Result<(usize, usize), Box<dyn Error>> {
    let (rows, cols) = text
        .split_once(['x', 'X'])
        .ok_or("expected dimensions like 15x22")?;
    Ok((rows.trim().parse()?, cols.trim().parse()?))
}

fn run_agent(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let Some(kind) = cli.agent else {
        return Err("no strategy selected".into());
    };
    let (layout, start, goal) = load_world(cli)?;

    let mut env = GridEnvironment::new(&layout)?;
    env.initialize_agent(start, cli.view_radius);
    let mut targets = HashMap::new();
    targets.insert(
        goal,
        TargetDescriptor {
            symbol: 'R',
            color: "red".to_string(),
        },
    );
    env.initialize_targets(&targets, cli.target_radius);

    for run in 0..cli.repeats {
        env.reset();
        let mut strategy = kind.build();
        if cli.log {
            let path = cli.log_dir.join(format!("episode_{run}.txt"));
            env.set_logging(&path, "labyrinth", strategy.name());
        }
        let outcome = if cli.show {
            run_tui_episode(&mut env, strategy.as_mut(), DEFAULT_STEP_BUDGET)?
        } else {
            run_episode(&mut env, strategy.as_mut(), DEFAULT_STEP_BUDGET)?
        };
        match outcome {
            EpisodeOutcome::GoalReached { steps } => println!(
                "run {run}: goal found after {steps} actions (path {}, score {:.1})",
                env.path_length, env.step_score
            ),
            EpisodeOutcome::BudgetExhausted { steps } => {
                println!("run {run}: agent did not find the goal in {steps} actions");
            }
        }
    }
    Ok(())
}

fn run_playback(cli: &Cli, path: &Path) -> Result<(), Box<dyn Error>> {
    let recording = Recording::load(path)?;
    let mut env = recording.build_environment()?;
    let mut agent = PlaybackAgent::new(&recording);

    if cli.show {
        with_terminal(|terminal| {
            let tick_rate = Duration::from_millis(80);
            loop {
                let stepped = agent.step(&mut env)?;
                let observation = env.observation()?;
                let grid = ui::observation_rows(&observation, env.agent_pos);
                let hud = format!(
                    "replaying {} | remaining: {} | path: {} | score: {:.1}",
                    recording.agent_type,
                    agent.remaining(),
                    env.path_length,
                    env.step_score
                );
                terminal.draw(|f| ui::draw_frame(f, grid, &hud))?;
                if stepped.is_none() {
                    break;
                }
                if event::poll(tick_rate)? {
                    if let Event::Key(key) = event::read()? {
                        if key.code == KeyCode::Char('q') {
                            break;
                        }
                    }
                }
            }
            Ok(())
        })?;
    } else {
        while agent.step(&mut env)?.is_some() {}
    }
    println!(
        "replayed {} actions; final position {:?}, path {}, score {:.1}",
        recording.actions.len(),
        env.agent_pos,
        env.path_length,
        env.step_score
    );
    Ok(())
}

/// Runs one episode inside the terminal view: one decision per tick, `q`
/// aborts the run.
fn run_tui_episode(
    env: &mut GridEnvironment,
    strategy: &mut dyn Strategy,
    step_budget: usize,
) -> Result<EpisodeOutcome, Box<dyn Error>> {
    env.start_episode();
    let outcome = with_terminal(|terminal| {
        let tick_rate = Duration::from_millis(80);
        let mut last_tick = Instant::now();
        let mut steps = 0;
        loop {
            if env.goal_reached() {
                return Ok(EpisodeOutcome::GoalReached { steps });
            }
            if steps >= step_budget {
                return Ok(EpisodeOutcome::BudgetExhausted { steps });
            }
            if last_tick.elapsed() >= tick_rate {
                let action = strategy.decide(env)?;
                env.perform_action(action)?;
                steps += 1;
                last_tick = Instant::now();
            }

            let observation = env.observation()?;
            let grid = ui::observation_rows(&observation, env.agent_pos);
            let hud = format!(
                "steps: {steps} | path: {} | score: {:.1} | facing: {} | q quits",
                env.path_length,
                env.step_score,
                env.facing.name()
            );
            terminal.draw(|f| ui::draw_frame(f, grid, &hud))?;

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_default();
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('q') {
                        return Ok(EpisodeOutcome::BudgetExhausted { steps });
                    }
                }
            }
        }
    })?;
    env.finish_episode();
    Ok(outcome)
}

/// Terminal setup/teardown around a ratatui session, restoring the screen
/// even when the body errors.
fn with_terminal<T>(
    body: impl FnOnce(&mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<T, Box<dyn Error>>,
) -> Result<T, Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = body(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}
