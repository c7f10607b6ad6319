//! Public evaluation types.

use search::EvalRecord;

/// A chess position evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eval {
    /// The position fingerprint (four-field FEN).
    pub fen: String,
    /// Search depth of the best evaluation.
    pub depth: i64,
    /// Kilo-nodes searched.
    pub knodes: i64,
    /// Principal variations from multi-PV analysis; the first is the best
    /// line.
    pub pvs: Vec<Pv>,
}

/// A principal variation (line of play) from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pv {
    /// Evaluation in centipawns from White's perspective. `None` when the
    /// position has a forced mate.
    pub centipawns: Option<i64>,
    /// Moves until checkmate; positive means White mates. `None` when there
    /// is no forced mate.
    pub mate: Option<i64>,
    /// The move sequence in UCI notation.
    pub line: String,
}

impl Eval {
    /// Converts an on-disk record, keeping the first (best) evaluation.
    pub(crate) fn from_record(record: EvalRecord) -> Self {
        let mut eval = Eval {
            fen: record.fen,
            depth: 0,
            knodes: 0,
            pvs: Vec::new(),
        };

        if let Some(best) = record.evals.into_iter().next() {
            eval.depth = best.depth;
            eval.knodes = best.knodes;
            eval.pvs = best
                .pvs
                .into_iter()
                .map(|pv| Pv {
                    centipawns: pv.cp,
                    mate: pv.mate,
                    line: pv.line,
                })
                .collect();
        }

        eval
    }

    /// The best principal variation, if any.
    #[must_use]
    pub fn best_pv(&self) -> Option<&Pv> {
        self.pvs.first()
    }

    /// Whether the best line is a forced checkmate.
    #[must_use]
    pub fn is_mate(&self) -> bool {
        self.best_pv().is_some_and(Pv::is_mate)
    }

    /// Human-readable score of the best line, `?` when there is none.
    #[must_use]
    pub fn score(&self) -> String {
        match self.best_pv() {
            Some(pv) => pv.score(),
            None => "?".to_string(),
        }
    }
}

impl Pv {
    /// Whether this variation ends in a forced checkmate.
    #[must_use]
    pub fn is_mate(&self) -> bool {
        self.mate.is_some()
    }

    /// Human-readable score: mate as `#<n>`, centipawns as signed
    /// two-decimal pawns (`+1.25`, `-0.50`, `+0.05`), `?` when absent.
    #[must_use]
    pub fn score(&self) -> String {
        if let Some(mate) = self.mate {
            return format!("#{mate}");
        }
        let Some(cp) = self.centipawns else {
            return "?".to_string();
        };

        let sign = if cp < 0 { '-' } else { '+' };
        let cp = cp.abs();
        format!("{sign}{}.{:02}", cp / 100, cp % 100)
    }
}
