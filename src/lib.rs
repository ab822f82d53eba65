//! Grid-maze generation and solving.
//!
//! A maze is a rectangular grid of blocked and open cells with three
//! marked positions: a start on the edge, a key the route must collect,
//! and a goal. The generator carves randomized corridors, forces both
//! legs (start to key, key to goal) to connect, and validates every
//! candidate with the breadth-first solver, so each grid it returns is
//! walkable end to end.
//!
//! Presentation stays outside the library: renderers consume cell states
//! through the read-only [`Grid`] accessors and watch solved paths
//! through the [`RevealSink`] seam.

pub mod generate;
pub mod grid;
pub mod solve;
pub mod walkthrough;

pub use generate::generate;
pub use grid::{Cell, Grid, Pos};
pub use solve::{auto_solve, solve, SolveError};
pub use walkthrough::{replay, RevealSink};
