use serde::{Deserialize, Serialize};

/// Ordinal classification of a drive duration. The thresholds live here and
/// nowhere else; the scorer and every report consumer share this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommuteBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CommuteBand {
    /// Classify a drive duration in minutes.
    pub fn classify(duration_min: f64) -> Self {
        if duration_min <= 20.0 {
            Self::Excellent
        } else if duration_min <= 40.0 {
            Self::Good
        } else if duration_min <= 60.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "优秀",
            Self::Good => "良好",
            Self::Fair => "一般",
            Self::Poor => "较远",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Excellent => "✓✓",
            Self::Good => "✓",
            Self::Fair => "○",
            Self::Poor => "✗",
        }
    }

    /// Points this band contributes to the commute score term.
    pub const fn points(self) -> u8 {
        match self {
            Self::Excellent => 25,
            Self::Good => 20,
            Self::Fair => 15,
            Self::Poor => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_band_boundaries() {
        assert_eq!(CommuteBand::classify(18.0), CommuteBand::Excellent);
        assert_eq!(CommuteBand::classify(20.0), CommuteBand::Excellent);
        assert_eq!(CommuteBand::classify(20.5), CommuteBand::Good);
        assert_eq!(CommuteBand::classify(40.0), CommuteBand::Good);
        assert_eq!(CommuteBand::classify(41.0), CommuteBand::Fair);
        assert_eq!(CommuteBand::classify(60.0), CommuteBand::Fair);
        assert_eq!(CommuteBand::classify(60.1), CommuteBand::Poor);
    }

    #[test]
    fn classification_is_monotonic_in_duration() {
        let mut previous = CommuteBand::classify(0.0);
        let mut minutes = 0.0;
        while minutes <= 120.0 {
            let band = CommuteBand::classify(minutes);
            assert!(band >= previous, "band worsened non-monotonically at {minutes}");
            previous = band;
            minutes += 0.5;
        }
    }

    #[test]
    fn labels_and_points_follow_the_band() {
        assert_eq!(CommuteBand::Excellent.label(), "优秀");
        assert_eq!(CommuteBand::Excellent.symbol(), "✓✓");
        assert_eq!(CommuteBand::Poor.points(), 10);
        assert_eq!(CommuteBand::Excellent.points(), 25);
    }
}
