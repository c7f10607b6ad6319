//! Material-based sharding.

use crate::{fnv1a32, Strategy};

/// Routes positions by their material configuration.
///
/// The 19-bit key layout:
///
/// | Bits  | Field                           |
/// |-------|---------------------------------|
/// | 0–2   | min(white queens, 7)            |
/// | 3–5   | min(black queens, 7)            |
/// | 6–8   | min(white rooks, 7)             |
/// | 9–11  | min(black rooks, 7)             |
/// | 12–14 | min(white bishops + knights, 7) |
/// | 15–17 | min(black bishops + knights, 7) |
/// | 18    | side to move (0=white, 1=black) |
///
/// That is up to 524,288 distinct keys, reduced modulo `total_shards`.
///
/// The input is parsed as-is, without normalization: halfmove/fullmove
/// trailers do not affect the material fields, and skipping the extra pass
/// keeps existing shard assignments stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialStrategy;

impl Strategy for MaterialStrategy {
    fn name(&self) -> &'static str {
        "material"
    }

    fn shard_id(&self, fen: &str, total_shards: u32) -> u32 {
        let Ok(mat) = fen::material(fen) else {
            // Unparseable material degrades to a raw-input hash.
            return fnv1a32(fen.as_bytes()) % total_shards;
        };

        let mut key: u32 = 0;
        key |= mat.white_queens.min(7);
        key |= mat.black_queens.min(7) << 3;
        key |= mat.white_rooks.min(7) << 6;
        key |= mat.black_rooks.min(7) << 9;
        key |= (mat.white_bishops + mat.white_knights).min(7) << 12;
        key |= (mat.black_bishops + mat.black_knights).min(7) << 15;

        if fen::side_to_move(fen) == Ok(fen::Side::Black) {
            key |= 1 << 18;
        }

        key % total_shards
    }
}
