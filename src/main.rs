use std::collections::HashSet;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unicode_width::UnicodeWidthStr;

use keymaze::{auto_solve, generate, replay, Grid, Pos, RevealSink};

const CELL_W: usize = 2;
const DEFAULT_STEP_MS: u64 = 200;

#[derive(Debug, Parser)]
#[command(name = "keymaze", version, about = "Generate and solve key-and-goal grid mazes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a maze and print it.
    Generate(MazeArgs),
    /// Generate a maze, solve it through the key, and print or animate the route.
    Solve(SolveArgs),
}

#[derive(Debug, Args)]
struct MazeArgs {
    /// Grid dimension; the maze is size x size.
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(5..=20))]
    size: u16,

    /// Generation seed; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct SolveArgs {
    #[command(flatten)]
    maze: MazeArgs,

    /// Replay the route cell by cell in the terminal.
    #[arg(long)]
    animate: bool,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Solve(args) => run_solve(&args),
    }
}

fn build_maze(args: &MazeArgs) -> (Grid, u64) {
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);
    let size = args.size as usize;
    (generate(&mut rng, size, size), seed)
}

fn run_generate(args: &MazeArgs) -> io::Result<()> {
    let (grid, seed) = build_maze(args);
    println!("{0}x{0} maze (seed {1})", args.size, seed);
    print_grid(&mut io::stdout(), &grid, &HashSet::new())
}

fn run_solve(args: &SolveArgs) -> io::Result<()> {
    let (grid, seed) = build_maze(&args.maze);
    let route = match auto_solve(&grid) {
        Ok(route) => route,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if args.animate {
        return animate_route(&grid, &route, seed);
    }

    println!("{0}x{0} maze (seed {1})", args.maze.size, seed);
    let mut stdout = io::stdout();
    print_grid(&mut stdout, &grid, &route.iter().copied().collect())?;
    println!("route, {} steps:", route.len() - 1);
    println!("{}", format_route(&route));
    Ok(())
}

fn format_route(route: &[Pos]) -> String {
    route
        .iter()
        .map(|pos| format!("({},{})", pos.row, pos.col))
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Wall,
    Floor,
    Start,
    Key,
    Goal,
    Trail,
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct CellView {
    glyph: Glyph,
    color: Color,
}

fn view_for(grid: &Grid, pos: Pos, on_trail: bool) -> CellView {
    let cell = grid.cell(pos);
    if cell.is_start {
        return CellView {
            glyph: Glyph::Start,
            color: Color::Green,
        };
    }
    if cell.is_key {
        return CellView {
            glyph: Glyph::Key,
            color: Color::Yellow,
        };
    }
    if cell.is_goal {
        return CellView {
            glyph: Glyph::Goal,
            color: Color::Red,
        };
    }
    if on_trail {
        return CellView {
            glyph: Glyph::Trail,
            color: Color::Cyan,
        };
    }
    if cell.blocked {
        return CellView {
            glyph: Glyph::Wall,
            color: Color::Blue,
        };
    }
    CellView {
        glyph: Glyph::Floor,
        color: Color::DarkGrey,
    }
}

fn glyph_text(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Wall => "██",
        Glyph::Floor => "· ",
        Glyph::Start => "🚪",
        Glyph::Key => "🔑",
        Glyph::Goal => "🏁",
        Glyph::Trail => "● ",
    }
}

fn print_grid(stdout: &mut Stdout, grid: &Grid, trail: &HashSet<Pos>) -> io::Result<()> {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let pos = Pos { row, col };
            let view = view_for(grid, pos, trail.contains(&pos));
            let text = glyph_text(view.glyph);
            stdout.queue(SetForegroundColor(view.color))?;
            stdout.queue(Print(text))?;
            let w = UnicodeWidthStr::width(text);
            if w < CELL_W {
                for _ in 0..(CELL_W - w) {
                    stdout.queue(Print(' '))?;
                }
            }
        }
        stdout.queue(ResetColor)?;
        stdout.queue(Print("\n"))?;
    }
    stdout.flush()
}

fn draw_cell(
    stdout: &mut Stdout,
    origin_x: u16,
    origin_y: u16,
    pos: Pos,
    view: CellView,
) -> io::Result<()> {
    let text = glyph_text(view.glyph);
    let x_pos = origin_x + (pos.col * CELL_W) as u16;
    let y_pos = origin_y + pos.row as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(view.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn animate_route(grid: &Grid, route: &[Pos], seed: u64) -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run_walkthrough(&mut stdout, grid, route, seed);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run_walkthrough(stdout: &mut Stdout, grid: &Grid, route: &[Pos], seed: u64) -> io::Result<()> {
    let needed_h = (grid.rows() + 2) as u16;
    let needed_w = (grid.cols() * CELL_W) as u16;
    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(MoveTo(0, 0))?;
        stdout.queue(Print(format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        )))?;
        stdout.flush()?;
        return wait_for_quit();
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;

    stdout.queue(MoveTo(origin_x, origin_y - 1))?;
    stdout.queue(SetForegroundColor(Color::White))?;
    stdout.queue(Print(format!("Solving maze (seed {seed})...")))?;
    stdout.queue(ResetColor)?;
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let pos = Pos { row, col };
            draw_cell(stdout, origin_x, origin_y, pos, view_for(grid, pos, false))?;
        }
    }
    stdout.flush()?;

    let mut walker = Walkthrough {
        stdout: &mut *stdout,
        grid,
        origin_x,
        origin_y,
        step: step_delay(),
        error: None,
    };
    replay(route, &mut walker);
    if let Some(err) = walker.error {
        return Err(err);
    }

    stdout.queue(MoveTo(origin_x, origin_y - 1))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(SetForegroundColor(Color::White))?;
    stdout.queue(Print(format!(
        "Maze solved in {} steps. (q to quit)",
        route.len() - 1
    )))?;
    stdout.queue(ResetColor)?;
    stdout.flush()?;
    wait_for_quit()
}

struct Walkthrough<'a> {
    stdout: &'a mut Stdout,
    grid: &'a Grid,
    origin_x: u16,
    origin_y: u16,
    step: Duration,
    error: Option<io::Error>,
}

impl Walkthrough<'_> {
    fn reveal(&mut self, pos: Pos) -> io::Result<()> {
        // Marker cells redraw as themselves; only plain floor turns into
        // trail.
        let view = view_for(self.grid, pos, true);
        draw_cell(self.stdout, self.origin_x, self.origin_y, pos, view)?;
        self.stdout.flush()?;
        thread::sleep(self.step);
        Ok(())
    }
}

impl RevealSink for Walkthrough<'_> {
    fn on_cell_revealed(&mut self, pos: Pos) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.reveal(pos) {
            self.error = Some(err);
        }
    }
}

fn wait_for_quit() -> io::Result<()> {
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    return Ok(());
                }
            }
        }
    }
}

fn step_delay() -> Duration {
    let ms = std::env::var("KEYMAZE_STEP_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_STEP_MS);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn size_outside_bounds_is_rejected() {
        assert!(Cli::try_parse_from(["keymaze", "generate", "--size", "4"]).is_err());
        assert!(Cli::try_parse_from(["keymaze", "generate", "--size", "21"]).is_err());
        assert!(Cli::try_parse_from(["keymaze", "generate", "--size", "5"]).is_ok());
        assert!(Cli::try_parse_from(["keymaze", "generate", "--size", "20"]).is_ok());
    }

    #[test]
    fn route_formats_as_coordinate_chain() {
        let route = [
            Pos { row: 0, col: 0 },
            Pos { row: 0, col: 1 },
            Pos { row: 1, col: 1 },
        ];
        assert_eq!(format_route(&route), "(0,0) -> (0,1) -> (1,1)");
    }

    #[test]
    fn markers_win_over_the_trail() {
        let mut rng = StdRng::seed_from_u64(8);
        let grid = generate(&mut rng, 6, 6);
        let start_view = view_for(&grid, grid.start(), true);
        assert!(start_view.glyph == Glyph::Start);
        let key_view = view_for(&grid, grid.key(), true);
        assert!(key_view.glyph == Glyph::Key);
    }
}
