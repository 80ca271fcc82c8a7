//! Board geometry: the 61-cell flower board in doubled offset coordinates
//!
//! Rows and columns are "doubled": vertically adjacent cells in the same
//! column differ by two rows, diagonal neighbours by one row and one column.
//! The valid cell set, its dense indexing and both neighbour tables are built
//! once and shared read-only for the rest of the process.

use std::fmt;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of valid positions on the board
pub const CELL_COUNT: usize = 61;

/// First and last row used by any position
pub const MIN_ROW: u8 = 4;
pub const MAX_ROW: u8 = 20;

/// First and last column used by any position
pub const MIN_COL: u8 = 4;
pub const MAX_COL: u8 = 12;

/// Single-step offsets (row, col), in enumeration order
const ADJACENT_OFFSETS: [(i8, i8); 6] = [
    (-2, 0),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
    (2, 0),
];

/// Jump-step offsets (row, col), in enumeration order
const REACH_OFFSETS: [(i8, i8); 12] = [
    (-4, 0),
    (-3, -1),
    (-3, 1),
    (-2, -2),
    (-2, 2),
    (0, -2),
    (0, 2),
    (2, -2),
    (2, 2),
    (3, -1),
    (3, 1),
    (4, 0),
];

// ============================================================================
// POSITION
// ============================================================================

/// A board coordinate in the doubled offset scheme
///
/// Any (row, col) pair can be represented; only 61 of them are on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Position at a signed offset, or None if it leaves the u8 range
    fn offset(self, (dr, dc): (i8, i8)) -> Option<Position> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Position::new(row, col))
    }

    /// Check if this position is on the board
    pub fn is_valid(self) -> bool {
        geometry().index_of(self).is_some()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Precomputed board shape and neighbour tables
///
/// Neighbour lists hold dense cell indices and keep the offset order above,
/// which is also the order moves are enumerated in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    positions: Vec<Position>,
    indices: FxHashMap<Position, u8>,
    adjacent: Vec<Vec<u8>>,
    reach: Vec<Vec<u8>>,
}

/// The process-wide geometry, built on first use
pub fn geometry() -> &'static Geometry {
    static GEOMETRY: OnceLock<Geometry> = OnceLock::new();
    GEOMETRY.get_or_init(Geometry::generate)
}

impl Geometry {
    /// Build the geometry from scratch
    ///
    /// [`geometry()`] caches one instance; calling this directly yields an
    /// independent copy.
    pub fn generate() -> Self {
        let positions = enumerate_positions();
        let indices: FxHashMap<Position, u8> = positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| (pos, i as u8))
            .collect();

        let neighbours = |offsets: &[(i8, i8)]| -> Vec<Vec<u8>> {
            positions
                .iter()
                .map(|&pos| {
                    offsets
                        .iter()
                        .filter_map(|&off| pos.offset(off))
                        .filter_map(|p| indices.get(&p).copied())
                        .collect()
                })
                .collect()
        };

        let adjacent = neighbours(&ADJACENT_OFFSETS);
        let reach = neighbours(&REACH_OFFSETS);

        Self {
            positions,
            indices,
            adjacent,
            reach,
        }
    }

    /// Number of cells on the board
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All positions in index order
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Position for a dense index
    pub fn position(&self, index: usize) -> Position {
        self.positions[index]
    }

    /// Dense index of a position, None if off the board
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.indices.get(&pos).map(|&i| i as usize)
    }

    /// Indices one clone-step away
    pub fn adjacent(&self, index: usize) -> &[u8] {
        &self.adjacent[index]
    }

    /// Indices one jump-step away
    pub fn reach(&self, index: usize) -> &[u8] {
        &self.reach[index]
    }

    /// Clone destinations followed by jump destinations
    pub fn destinations(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacent[index]
            .iter()
            .chain(self.reach[index].iter())
            .map(|&i| i as usize)
    }

    pub fn is_adjacent(&self, from: usize, to: usize) -> bool {
        self.adjacent[from].contains(&(to as u8))
    }

    pub fn is_reach(&self, from: usize, to: usize) -> bool {
        self.reach[from].contains(&(to as u8))
    }
}

/// The fixed board enumeration: a four-row widening cap, five banded row
/// pairs, and a mirrored taper down to the bottom apex.
fn enumerate_positions() -> Vec<Position> {
    let mut positions = Vec::with_capacity(CELL_COUNT);

    positions.push(Position::new(4, 8));
    positions.extend([Position::new(5, 7), Position::new(5, 9)]);
    positions.extend([Position::new(6, 6), Position::new(6, 8), Position::new(6, 10)]);
    positions.extend([
        Position::new(7, 5),
        Position::new(7, 7),
        Position::new(7, 9),
        Position::new(7, 11),
    ]);

    for row in (8..=17).step_by(2) {
        for col in (4..=11).step_by(2) {
            positions.push(Position::new(row, col));
            positions.push(Position::new(row + 1, col + 1));
        }
        positions.push(Position::new(row, 12));
    }

    positions.extend([
        Position::new(18, 6),
        Position::new(18, 8),
        Position::new(18, 10),
        Position::new(19, 7),
        Position::new(19, 9),
        Position::new(20, 8),
    ]);

    positions
}

// ============================================================================
// TESTS
// ============================================================================
