//! # FEN — position fingerprint parsing
//!
//! Utilities for working with Forsyth-Edwards Notation strings. The lookup
//! engine keys every record by a *fingerprint*: the first four
//! whitespace-separated FEN fields (piece placement, side to move, castling
//! rights, en passant square). The halfmove clock and fullmove number are
//! irrelevant to an evaluation, so [`normalize`] strips them.
//!
//! All functions here are pure, deterministic, and avoid allocation beyond
//! the returned value — they sit on the hot path of both sharding and lookup.

use thiserror::Error;

/// The FEN string is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid FEN notation")]
pub struct InvalidFen;

/// Which player moves next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The single-letter FEN token for this side.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "w",
            Side::Black => "b",
        }
    }
}

/// Piece counts for both sides, derived from the placement field.
///
/// Kings are not counted — they are always present.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub white_pawns: u32,
    pub white_knights: u32,
    pub white_bishops: u32,
    pub white_rooks: u32,
    pub white_queens: u32,

    pub black_pawns: u32,
    pub black_knights: u32,
    pub black_bishops: u32,
    pub black_rooks: u32,
    pub black_queens: u32,
}

/// Returns the normalized fingerprint for a FEN string: the first four
/// whitespace-separated fields rejoined by single spaces.
///
/// Validation:
/// - at least four fields must be present
/// - the side-to-move field must be `w` or `b`
/// - the placement field must be eight `/`-separated ranks of exactly eight
///   squares each (digits 1–8 are empty runs, `PNBRQK`/`pnbrqk` are pieces)
///
/// # Errors
///
/// Returns [`InvalidFen`] if any of the above fails.
pub fn normalize(fen: &str) -> Result<String, InvalidFen> {
    let mut fields = fen.split_whitespace();
    let placement = fields.next().ok_or(InvalidFen)?;
    let side = fields.next().ok_or(InvalidFen)?;
    let castling = fields.next().ok_or(InvalidFen)?;
    let en_passant = fields.next().ok_or(InvalidFen)?;

    if side != "w" && side != "b" {
        return Err(InvalidFen);
    }
    if !is_valid_placement(placement) {
        return Err(InvalidFen);
    }

    let mut out = String::with_capacity(
        placement.len() + side.len() + castling.len() + en_passant.len() + 3,
    );
    out.push_str(placement);
    out.push(' ');
    out.push_str(side);
    out.push(' ');
    out.push_str(castling);
    out.push(' ');
    out.push_str(en_passant);
    Ok(out)
}

/// Extracts material counts from the placement field of a FEN string.
///
/// # Errors
///
/// Returns [`InvalidFen`] if the string is empty or the placement field
/// contains a byte that is not a piece letter, a digit, or `/`.
pub fn material(fen: &str) -> Result<Material, InvalidFen> {
    let placement = fen.split_whitespace().next().ok_or(InvalidFen)?;

    let mut m = Material::default();
    for b in placement.bytes() {
        match b {
            b'P' => m.white_pawns += 1,
            b'N' => m.white_knights += 1,
            b'B' => m.white_bishops += 1,
            b'R' => m.white_rooks += 1,
            b'Q' => m.white_queens += 1,
            b'p' => m.black_pawns += 1,
            b'n' => m.black_knights += 1,
            b'b' => m.black_bishops += 1,
            b'r' => m.black_rooks += 1,
            b'q' => m.black_queens += 1,
            // Kings are always present, don't count them.
            b'K' | b'k' => {}
            b'/' | b'1'..=b'8' => {}
            _ => return Err(InvalidFen),
        }
    }

    Ok(m)
}

/// Returns the side to move from a FEN string.
///
/// # Errors
///
/// Returns [`InvalidFen`] if the second field is missing or is not `w`/`b`.
pub fn side_to_move(fen: &str) -> Result<Side, InvalidFen> {
    let mut fields = fen.split_whitespace();
    fields.next().ok_or(InvalidFen)?;
    match fields.next() {
        Some("w") => Ok(Side::White),
        Some("b") => Ok(Side::Black),
        _ => Err(InvalidFen),
    }
}

/// Validates the placement field: eight ranks, each summing to eight squares.
fn is_valid_placement(placement: &str) -> bool {
    let mut ranks = 0;
    for rank in placement.split('/') {
        ranks += 1;
        let mut squares = 0u32;
        for b in rank.bytes() {
            match b {
                b'1'..=b'8' => squares += u32::from(b - b'0'),
                b'P' | b'N' | b'B' | b'R' | b'Q' | b'K' | b'p' | b'n' | b'b' | b'r' | b'q'
                | b'k' => squares += 1,
                _ => return false,
            }
        }
        if squares != 8 {
            return false;
        }
    }
    ranks == 8
}

#[cfg(test)]
mod tests;
