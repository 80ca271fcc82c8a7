//! Board snapshots, moves and scoring

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseMoveError;
use crate::geometry::{geometry, Position, CELL_COUNT};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Red,
    Yellow,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Red => Player::Yellow,
            Player::Yellow => Player::Red,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Red => f.write_str("Red"),
            Player::Yellow => f.write_str("Yellow"),
        }
    }
}

/// Occupancy of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty,
    Red,
    Yellow,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Owning player, None for an empty cell
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Player::Red),
            Cell::Yellow => Some(Player::Yellow),
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::Red => Cell::Red,
            Player::Yellow => Cell::Yellow,
        }
    }
}

/// How a legal move relocates the piece
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// Destination is adjacent; the source keeps its piece
    Clone,
    /// Destination is a jump away; the source is vacated
    Jump,
}

/// A move from one position to another
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Parse `fromRow,fromCol,toRow,toCol`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(ParseMoveError::FieldCount(fields.len()));
        }

        let mut coords = [0u8; 4];
        for (slot, field) in coords.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|source| ParseMoveError::Coordinate {
                field: field.to_string(),
                source,
            })?;
        }

        Ok(Move::new(
            Position::new(coords[0], coords[1]),
            Position::new(coords[2], coords[3]),
        ))
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// One board snapshot: a cell state per position, tagged with its pool slot
///
/// Snapshots are handed out by [`BoardPool`](crate::pool::BoardPool) and are
/// deliberately not `Clone`; copy state with [`Board::copy_from`] into
/// another acquired snapshot instead.
#[derive(Debug)]
#[must_use = "boards belong to a pool and must be released back to it"]
pub struct Board {
    slot: usize,
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Empty board bound to a pool slot
    pub(crate) fn vacant(slot: usize) -> Self {
        Self {
            slot,
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Pool slot this snapshot occupies
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Cell at a position, None if off the board
    pub fn get(&self, pos: Position) -> Option<Cell> {
        geometry().index_of(pos).map(|i| self.cells[i])
    }

    /// Cell by dense index
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    /// All cells in index order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Overwrite a cell; returns false if the position is off the board
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match geometry().index_of(pos) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Positions currently in the given state, in index order
    pub fn positions_of(&self, state: Cell) -> impl Iterator<Item = Position> + '_ {
        let geo = geometry();
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, &c)| c == state)
            .map(move |(i, _)| geo.position(i))
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    /// Copy every cell state from another snapshot
    pub fn copy_from(&mut self, source: &Board) {
        self.cells = source.cells;
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells = [Cell::Empty; CELL_COUNT];
    }

    /// The standard opening: three pieces each on alternating corners
    pub fn setup_standard(&mut self) {
        self.clear();
        for (row, col) in [(4, 8), (16, 4), (16, 12)] {
            self.set(Position::new(row, col), Cell::Red);
        }
        for (row, col) in [(8, 4), (8, 12), (20, 8)] {
            self.set(Position::new(row, col), Cell::Yellow);
        }
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Classify a move by geometry alone, None if neither clone nor jump
    pub fn move_kind(mv: Move) -> Option<MoveKind> {
        let geo = geometry();
        let from = geo.index_of(mv.from)?;
        let to = geo.index_of(mv.to)?;
        if geo.is_adjacent(from, to) {
            Some(MoveKind::Clone)
        } else if geo.is_reach(from, to) {
            Some(MoveKind::Jump)
        } else {
            None
        }
    }

    /// Moves from one position to every empty clone or jump destination
    pub fn moves_from(&self, pos: Position) -> Vec<Move> {
        let geo = geometry();
        match geo.index_of(pos) {
            Some(from) => geo
                .destinations(from)
                .filter(|&to| self.cells[to].is_empty())
                .map(|to| Move::new(pos, geo.position(to)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every legal move for a player
    ///
    /// Ordered by source index, then clone destinations before jumps, each in
    /// neighbour-table order.
    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        let geo = geometry();
        let own = Cell::from(player);
        let mut moves = Vec::new();

        for (from, _) in self.cells.iter().enumerate().filter(|(_, &c)| c == own) {
            let from_pos = geo.position(from);
            for to in geo.destinations(from) {
                if self.cells[to].is_empty() {
                    moves.push(Move::new(from_pos, geo.position(to)));
                }
            }
        }

        moves
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Apply a move in place
    ///
    /// Returns false and leaves the board untouched unless the destination is
    /// a clone or jump step away, the source is occupied and the destination
    /// is empty. On success every occupied cell adjacent to the destination
    /// is converted to the mover's colour.
    pub fn apply(&mut self, mv: Move) -> bool {
        let geo = geometry();
        let (from, to) = match (geo.index_of(mv.from), geo.index_of(mv.to)) {
            (Some(from), Some(to)) => (from, to),
            _ => return false,
        };

        let kind = if geo.is_adjacent(from, to) {
            MoveKind::Clone
        } else if geo.is_reach(from, to) {
            MoveKind::Jump
        } else {
            return false;
        };

        let mover = self.cells[from];
        if mover.is_empty() || !self.cells[to].is_empty() {
            return false;
        }

        self.cells[to] = mover;
        if kind == MoveKind::Jump {
            self.cells[from] = Cell::Empty;
        }

        for &n in geo.adjacent(to) {
            let cell = &mut self.cells[n as usize];
            if !cell.is_empty() {
                *cell = mover;
            }
        }

        true
    }

    // ========================================================================
    // SCORING
    // ========================================================================

    /// Number of cells in the given state
    pub fn score(&self, state: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Player's cell count minus the opponent's
    pub fn differential(&self, player: Player) -> i32 {
        self.score(player.into()) as i32 - self.score(player.opponent().into()) as i32
    }
}

// ============================================================================
// TESTS
// ============================================================================
