use super::*;

const STARTING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// -------------------- normalize --------------------

#[test]
fn normalize_strips_move_counters() {
    let got = normalize(STARTING).unwrap();
    assert_eq!(got, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
}

#[test]
fn normalize_is_identity_on_four_fields() {
    let fp = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";
    assert_eq!(normalize(fp).unwrap(), fp);
}

#[test]
fn normalize_collapses_whitespace_runs() {
    let got = normalize("8/8/8/8/8/8/8/8  w \t - -  3 17").unwrap();
    assert_eq!(got, "8/8/8/8/8/8/8/8 w - -");
}

#[test]
fn normalize_rejects_too_few_fields() {
    assert_eq!(normalize("8/8/8/8/8/8/8/8 w -"), Err(InvalidFen));
    assert_eq!(normalize(""), Err(InvalidFen));
}

#[test]
fn normalize_rejects_bad_side() {
    assert_eq!(normalize("8/8/8/8/8/8/8/8 x - -"), Err(InvalidFen));
}

#[test]
fn normalize_rejects_bad_placement() {
    // seven ranks
    assert_eq!(normalize("8/8/8/8/8/8/8 w - -"), Err(InvalidFen));
    // rank summing to nine squares
    assert_eq!(normalize("9/8/8/8/8/8/8/8 w - -"), Err(InvalidFen));
    // rank summing to seven squares
    assert_eq!(normalize("7/8/8/8/8/8/8/8 w - -"), Err(InvalidFen));
    // stray byte in placement
    assert_eq!(normalize("8/8/8/8/x7/8/8/8 w - -"), Err(InvalidFen));
}

// -------------------- material --------------------

#[test]
fn material_counts_starting_position() {
    let m = material(STARTING).unwrap();
    assert_eq!(m.white_pawns, 8);
    assert_eq!(m.white_knights, 2);
    assert_eq!(m.white_bishops, 2);
    assert_eq!(m.white_rooks, 2);
    assert_eq!(m.white_queens, 1);
    assert_eq!(m.black_pawns, 8);
    assert_eq!(m.black_knights, 2);
    assert_eq!(m.black_bishops, 2);
    assert_eq!(m.black_rooks, 2);
    assert_eq!(m.black_queens, 1);
}

#[test]
fn material_empty_board() {
    let m = material("8/8/8/8/8/8/8/8 w - -").unwrap();
    assert_eq!(m, Material::default());
}

#[test]
fn material_kings_not_counted() {
    let m = material("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
    assert_eq!(m, Material::default());
}

#[test]
fn material_rejects_unknown_byte() {
    assert_eq!(material("8/8/8/8/z7/8/8/8 w - -"), Err(InvalidFen));
    assert_eq!(material(""), Err(InvalidFen));
}

#[test]
fn material_tolerates_missing_trailer_fields() {
    // Only the placement field is inspected.
    let m = material("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").unwrap();
    assert_eq!(m.white_pawns, 8);
}

// -------------------- side_to_move --------------------

#[test]
fn side_to_move_white_and_black() {
    assert_eq!(side_to_move("8/8/8/8/8/8/8/8 w - -"), Ok(Side::White));
    assert_eq!(side_to_move("8/8/8/8/8/8/8/8 b - -"), Ok(Side::Black));
}

#[test]
fn side_to_move_rejects_missing_or_bad() {
    assert_eq!(side_to_move("8/8/8/8/8/8/8/8"), Err(InvalidFen));
    assert_eq!(side_to_move("8/8/8/8/8/8/8/8 W - -"), Err(InvalidFen));
}

#[test]
fn side_as_str() {
    assert_eq!(Side::White.as_str(), "w");
    assert_eq!(Side::Black.as_str(), "b");
}
