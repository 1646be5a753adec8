use crate::domain::types::ExamModule;

/// Descending raw-score thresholds over the 40-question scale: the first
/// threshold the (normalized) score meets or exceeds wins. Constructed once
/// as constants and passed explicitly; never mutated.
#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    module: ExamModule,
    thresholds: &'static [(u32, f64)],
    floor: f64,
}

const LISTENING_THRESHOLDS: &[(u32, f64)] = &[
    (39, 9.0),
    (37, 8.5),
    (35, 8.0),
    (32, 7.5),
    (30, 7.0),
    (26, 6.5),
    (23, 6.0),
    (18, 5.5),
    (16, 5.0),
    (13, 4.5),
    (10, 4.0),
    (8, 3.5),
    (6, 3.0),
    (4, 2.5),
];

// The finer-grained table with explicit low-end bands; the coarser variant
// flooring at 4.0 is superseded.
const READING_THRESHOLDS: &[(u32, f64)] = &[
    (39, 9.0),
    (37, 8.5),
    (35, 8.0),
    (33, 7.5),
    (30, 7.0),
    (27, 6.5),
    (23, 6.0),
    (19, 5.5),
    (15, 5.0),
    (13, 4.5),
    (10, 4.0),
    (8, 3.5),
    (6, 3.0),
    (4, 2.5),
];

pub const LISTENING: BandTable =
    BandTable { module: ExamModule::Listening, thresholds: LISTENING_THRESHOLDS, floor: 2.0 };

pub const READING: BandTable =
    BandTable { module: ExamModule::Reading, thresholds: READING_THRESHOLDS, floor: 2.0 };

pub fn table_for(module: ExamModule) -> &'static BandTable {
    match module {
        ExamModule::Listening => &LISTENING,
        ExamModule::Reading => &READING,
    }
}

impl BandTable {
    /// Denominator the thresholds are authored against.
    pub const SCALE: u32 = 40;

    pub fn module(&self) -> ExamModule {
        self.module
    }

    /// Total function over integer raw scores. Tests whose total differs
    /// from 40 are first normalized onto the 40-point scale.
    pub fn convert(&self, raw_score: u32, total_score: u32) -> f64 {
        let scaled = if total_score == Self::SCALE || total_score == 0 {
            raw_score.min(Self::SCALE)
        } else {
            let scaled =
                (raw_score as f64 * Self::SCALE as f64 / total_score as f64).round() as u32;
            scaled.min(Self::SCALE)
        };

        for (threshold, band) in self.thresholds {
            if scaled >= *threshold {
                return *band;
            }
        }
        self.floor
    }
}

/// Convenience form of the conversion for callers holding just the module.
pub fn raw_to_band(raw_score: u32, total_score: u32, module: ExamModule) -> f64 {
    table_for(module).convert(raw_score, total_score)
}
