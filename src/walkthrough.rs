use crate::grid::Pos;

/// Receives solved-path cells one at a time as a walkthrough replays.
///
/// The replay imposes no pacing and no styling; sinks decide how to show
/// each cell and how long to dwell on it.
pub trait RevealSink {
    fn on_cell_revealed(&mut self, pos: Pos);
}

/// Feed every position of `path` to `sink`, in path order.
pub fn replay(path: &[Pos], sink: &mut impl RevealSink) {
    for &pos in path {
        sink.on_cell_revealed(pos);
    }
}
