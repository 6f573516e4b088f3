//! Word-count scoring used when the model cannot be reached.

const DEFAULT_STRENGTHS: &str = "Response provided with reasonable effort.";
const DEFAULT_IMPROVEMENTS: &str = "Consider providing more specific examples and technical details.";

/// Score band for an answer of a given length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthBand {
    pub score: f64,
    pub feedback: &'static str,
}

/// `(exclusive upper word bound, band)`; answers past the last bound get 9
const BANDS: &[(usize, LengthBand)] = &[
    (
        5,
        LengthBand {
            score: 2.0,
            feedback: "Very brief response - needs more detail and examples.",
        },
    ),
    (
        20,
        LengthBand {
            score: 4.0,
            feedback: "Brief response - could benefit from more specific examples and details.",
        },
    ),
    (
        50,
        LengthBand {
            score: 6.0,
            feedback: "Adequate response length - good baseline answer.",
        },
    ),
    (
        100,
        LengthBand {
            score: 8.0,
            feedback: "Comprehensive response with good detail.",
        },
    ),
];

const LONGEST: LengthBand = LengthBand {
    score: 9.0,
    feedback: "Very detailed and thorough response.",
};

pub fn band_for(word_count: usize) -> LengthBand {
    BANDS
        .iter()
        .find(|(limit, _)| word_count < *limit)
        .map(|(_, band)| *band)
        .unwrap_or(LONGEST)
}

pub fn default_strengths() -> &'static str {
    DEFAULT_STRENGTHS
}

pub fn default_improvements() -> &'static str {
    DEFAULT_IMPROVEMENTS
}
