//! Unit conversions between API measurements and imperial thresholds.
//!
//! The catalog reports heights in decimetres and weights in hectograms. Grid
//! clues are phrased in feet/inches and pounds, so thresholds are converted into
//! the catalog's units once and compared there.

const CENTIMETRES_PER_INCH: f64 = 2.54;
const INCHES_PER_FOOT: f64 = 12.0;
const HECTOGRAMS_PER_POUND: f64 = 4.535_923_7;

// Absorbs float error so 36 inches does not come back as 2ft 11.999…in.
const ROUNDING_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Length {
    decimetres: f64,
}

impl Length {
    #[must_use]
    pub fn from_decimetres(decimetres: f64) -> Self {
        Self { decimetres }
    }

    #[must_use]
    pub fn from_feet_inches(feet: u32, inches: u32) -> Self {
        let total_inches = f64::from(feet) * INCHES_PER_FOOT + f64::from(inches);
        Self {
            decimetres: total_inches * CENTIMETRES_PER_INCH / 10.0,
        }
    }

    #[must_use]
    pub fn decimetres(self) -> f64 {
        self.decimetres
    }

    #[must_use]
    pub fn total_inches(self) -> f64 {
        self.decimetres * 10.0 / CENTIMETRES_PER_INCH
    }

    /// Splits the length into whole feet and remaining inches.
    #[must_use]
    pub fn to_feet_inches(self) -> (u32, f64) {
        let total = self.total_inches();
        let feet = ((total + ROUNDING_SLACK) / INCHES_PER_FOOT).floor().max(0.0);
        let inches = (total - feet * INCHES_PER_FOOT).max(0.0);
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let feet = feet as u32;
        (feet, inches)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Mass {
    hectograms: f64,
}

impl Mass {
    #[must_use]
    pub fn from_hectograms(hectograms: f64) -> Self {
        Self { hectograms }
    }

    #[must_use]
    pub fn from_pounds(pounds: f64) -> Self {
        Self {
            hectograms: pounds * HECTOGRAMS_PER_POUND,
        }
    }

    #[must_use]
    pub fn hectograms(self) -> f64 {
        self.hectograms
    }

    #[must_use]
    pub fn pounds(self) -> f64 {
        self.hectograms / HECTOGRAMS_PER_POUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_feet_inches_round_trip() {
        let (feet, inches) = Length::from_feet_inches(3, 0).to_feet_inches();
        assert_eq!(feet, 3);
        assert!(inches.abs() < EPSILON, "inches = {inches}");

        let (feet, inches) = Length::from_feet_inches(5, 7).to_feet_inches();
        assert_eq!(feet, 5);
        assert!((inches - 7.0).abs() < EPSILON, "inches = {inches}");
    }

    #[test]
    fn test_feet_inches_to_decimetres() {
        // 3'0" = 91.44 cm
        let length = Length::from_feet_inches(3, 0);
        assert!((length.decimetres() - 9.144).abs() < EPSILON);
        // pikachu (4 dm) is shorter, charizard (17 dm) is not
        assert!(Length::from_decimetres(4.0) < length);
        assert!(Length::from_decimetres(17.0) > length);
    }

    #[test]
    fn test_pounds_to_hectograms() {
        let mass = Mass::from_pounds(100.0);
        assert!((mass.hectograms() - 453.592_37).abs() < EPSILON);
        assert!((mass.pounds() - 100.0).abs() < EPSILON);
        // snorlax weighs 4600 hg (~1014 lbs)
        assert!(Mass::from_hectograms(4600.0) > Mass::from_pounds(1000.0));
    }
}
