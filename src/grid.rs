/// A single maze cell. Every cell begins blocked; generation opens the
/// carved corridors and the three marked cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub blocked: bool,
    pub is_start: bool,
    pub is_key: bool,
    pub is_goal: bool,
}

impl Cell {
    fn new() -> Self {
        Cell {
            blocked: true,
            is_start: false,
            is_key: false,
            is_goal: false,
        }
    }

    /// True when the cell carries the start, key, or goal marker.
    pub fn is_special(&self) -> bool {
        self.is_start || self.is_key || self.is_goal
    }
}

/// Grid coordinate, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    /// Manhattan distance to `other`.
    pub fn distance(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    // Every neighbor walk scans in this order; shortest-path tie-breaking
    // depends on it staying fixed.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }
}

/// Rectangular cell grid plus the three distinguished positions.
///
/// The generator builds and mutates a `Grid`; everything downstream
/// (solver, renderer) borrows it read-only. Dimension validation is the
/// caller's job, done at the CLI boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Cell>>,
    start: Pos,
    key: Pos,
    goal: Pos,
}

impl Grid {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        let origin = Pos { row: 0, col: 0 };
        Grid {
            rows,
            cols,
            cells: vec![vec![Cell::new(); cols]; rows],
            start: origin,
            key: origin,
            goal: origin,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn key(&self) -> Pos {
        self.key
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[pos.row][pos.col]
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// In-bounds orthogonal neighbors of `pos`, in up, down, left, right
    /// order.
    pub fn neighbors(&self, pos: Pos) -> Vec<Pos> {
        let mut out = Vec::with_capacity(4);
        for dir in Dir::ALL {
            let (dr, dc) = dir.delta();
            let row = pos.row as isize + dr;
            let col = pos.col as isize + dc;
            if row < 0 || col < 0 || row >= self.rows as isize || col >= self.cols as isize {
                continue;
            }
            out.push(Pos {
                row: row as usize,
                col: col as usize,
            });
        }
        out
    }

    pub(crate) fn set_blocked(&mut self, pos: Pos, blocked: bool) {
        self.cells[pos.row][pos.col].blocked = blocked;
    }

    pub(crate) fn mark_start(&mut self, pos: Pos) {
        self.cells[pos.row][pos.col].is_start = true;
        self.cells[pos.row][pos.col].blocked = false;
        self.start = pos;
    }

    pub(crate) fn mark_key(&mut self, pos: Pos) {
        self.cells[pos.row][pos.col].is_key = true;
        self.cells[pos.row][pos.col].blocked = false;
        self.key = pos;
    }

    pub(crate) fn mark_goal(&mut self, pos: Pos) {
        self.cells[pos.row][pos.col].is_goal = true;
        self.cells[pos.row][pos.col].blocked = false;
        self.goal = pos;
    }
}
