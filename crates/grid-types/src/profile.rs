use serde::{Deserialize, Serialize};

/// Steepest taper a profile segment may carry, in degrees from vertical.
pub const MAX_TAPER_DEG: f64 = 60.0;

/// One step of a stepped cross-section.
///
/// `rise` is always the vertical height of the step. A positive taper narrows
/// the outline as it rises; a negative taper widens it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub rise: f64,
    #[serde(default)]
    pub taper_deg: f64,
}

impl Segment {
    pub const fn straight(rise: f64) -> Self {
        Self {
            rise,
            taper_deg: 0.0,
        }
    }

    pub const fn tapered(rise: f64, taper_deg: f64) -> Self {
        Self { rise, taper_deg }
    }

    pub fn is_tapered(&self) -> bool {
        self.taper_deg.abs() > 1e-12
    }

    /// Horizontal inward travel of the outline over this step.
    pub fn inset(&self) -> f64 {
        self.rise * self.taper_deg.to_radians().tan()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile has no segments")]
    Empty,

    #[error("segment {index} has non-positive rise {rise}")]
    NonPositiveRise { index: usize, rise: f64 },

    #[error("segment {index} taper {taper_deg} exceeds +/-{max} degrees")]
    TaperOutOfRange {
        index: usize,
        taper_deg: f64,
        max: f64,
    },

    #[error("profile height {actual:.3} does not match declared height {expected:.3}")]
    HeightMismatch { expected: f64, actual: f64 },
}

/// Ordered list of segments, bottom first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub segments: Vec<Segment>,
}

impl Profile {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn straight(rise: f64) -> Self {
        Self::new(vec![Segment::straight(rise)])
    }

    pub fn total_height(&self) -> f64 {
        self.segments.iter().map(|s| s.rise).sum()
    }

    /// Net inward travel from the bottom outline to the top outline.
    pub fn total_inset(&self) -> f64 {
        self.segments.iter().map(Segment::inset).sum()
    }

    /// The same cross-section traversed top to bottom.
    pub fn inverted(&self) -> Profile {
        Profile::new(
            self.segments
                .iter()
                .rev()
                .map(|s| Segment::tapered(s.rise, -s.taper_deg))
                .collect(),
        )
    }

    pub fn then(mut self, seg: Segment) -> Profile {
        self.segments.push(seg);
        self
    }

    pub fn after(mut self, seg: Segment) -> Profile {
        self.segments.insert(0, seg);
        self
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.segments.is_empty() {
            return Err(ProfileError::Empty);
        }
        for (index, s) in self.segments.iter().enumerate() {
            if !(s.rise > 0.0) {
                return Err(ProfileError::NonPositiveRise {
                    index,
                    rise: s.rise,
                });
            }
            if s.taper_deg.abs() > MAX_TAPER_DEG {
                return Err(ProfileError::TaperOutOfRange {
                    index,
                    taper_deg: s.taper_deg,
                    max: MAX_TAPER_DEG,
                });
            }
        }
        Ok(())
    }

    /// Validate and check the total against the cavity height it must fill.
    pub fn validate_height(&self, expected: f64, tol: f64) -> Result<(), ProfileError> {
        self.validate()?;
        let actual = self.total_height();
        if (actual - expected).abs() > tol {
            return Err(ProfileError::HeightMismatch { expected, actual });
        }
        Ok(())
    }
}
