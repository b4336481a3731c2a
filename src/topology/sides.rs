use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// Custom error types for `CompassSide`.
#[derive(Debug, Clone)]
pub enum CompassSideError {
    /// Indicates that the provided side string is invalid.
    InvalidSide(String),
}

impl fmt::Display for CompassSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompassSideError::InvalidSide(value) => {
                write!(f, "Invalid compass side: '{}'", value)
            }
        }
    }
}

impl std::error::Error for CompassSideError {}

lazy_static! {
    static ref SIDE_CONVERTER: HashMap<&'static str, CompassSide> = {
        let mut m = HashMap::new();
        m.insert("N", CompassSide::North);
        m.insert("E", CompassSide::East);
        m.insert("S", CompassSide::South);
        m.insert("W", CompassSide::West);
        m
    };
}

/// A side of the junction from which a road arrives or towards which it leaves.
///
/// The numeric values follow the clockwise convention N=0, E=1, S=2, W=3, so
/// that two sides are perpendicular exactly when the sum of their values is
/// odd, and opposite (or identical) when it is even. The phase enumerator and
/// the turn classifier both rely on this parity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompassSide {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl CompassSide {
    /// Converts a short string representation ("N", "E", "S", "W") to a `CompassSide`.
    ///
    /// # Example
    /// ```
    /// use junction_sim_core::topology::CompassSide;
    /// let side = CompassSide::from_str("N").unwrap();
    /// assert_eq!(side, CompassSide::North);
    /// ```
    pub fn from_str(side_str: &str) -> Result<Self, CompassSideError> {
        SIDE_CONVERTER
            .get(side_str)
            .copied()
            .ok_or(CompassSideError::InvalidSide(side_str.to_string()))
    }

    /// Returns the numeric value of the side (N=0, E=1, S=2, W=3).
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Two sides are perpendicular when the sum of their values is odd.
    pub fn is_perpendicular_to(self, other: CompassSide) -> bool {
        (self.value() + other.value()) % 2 == 1
    }

    /// Two sides are opposite when the sum of their values is even.
    pub fn is_opposite_to(self, other: CompassSide) -> bool {
        (self.value() + other.value()) % 2 == 0
    }
}

impl fmt::Display for CompassSide {
    /// Formats the side as its single-letter code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use junction_sim_core::topology::CompassSide;
    ///
    /// assert_eq!(format!("{}", CompassSide::North), "N");
    /// assert_eq!(format!("{}", CompassSide::West), "W");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompassSide::North => "N",
            CompassSide::East => "E",
            CompassSide::South => "S",
            CompassSide::West => "W",
        };
        write!(f, "{}", s)
    }
}

/// Geometric type of a movement across the junction, classified from the
/// origin road's arrival side and the destination road's departure side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Right,
    Straight,
    Left,
}

impl Turn {
    /// Classifies the movement from `from_side` (origin road arrival side) to
    /// `to_side` (destination road departure side).
    ///
    /// Left turns are exactly the four movements N→E, W→N, S→W, E→S.
    /// Straight-through movements are those whose side values sum to an even
    /// number (opposite sides). Every remaining movement is a right turn.
    pub fn classify(from_side: CompassSide, to_side: CompassSide) -> Turn {
        use CompassSide::*;
        match (from_side, to_side) {
            (North, East) | (West, North) | (South, West) | (East, South) => Turn::Left,
            _ if from_side.is_opposite_to(to_side) => Turn::Straight,
            _ => Turn::Right,
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Turn::Right => "right",
            Turn::Straight => "straight",
            Turn::Left => "left",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side_valid() {
        assert_eq!(CompassSide::from_str("N").unwrap(), CompassSide::North);
        assert_eq!(CompassSide::from_str("E").unwrap(), CompassSide::East);
        assert_eq!(CompassSide::from_str("S").unwrap(), CompassSide::South);
        assert_eq!(CompassSide::from_str("W").unwrap(), CompassSide::West);
    }

    #[test]
    fn test_parse_side_invalid() {
        let result = CompassSide::from_str("X");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().to_string(), "Invalid compass side: 'X'");
    }

    #[test]
    fn test_parity() {
        assert!(CompassSide::North.is_perpendicular_to(CompassSide::East));
        assert!(CompassSide::South.is_perpendicular_to(CompassSide::West));
        assert!(CompassSide::North.is_opposite_to(CompassSide::South));
        assert!(CompassSide::East.is_opposite_to(CompassSide::West));
        assert!(!CompassSide::North.is_perpendicular_to(CompassSide::South));
    }

    #[test]
    fn test_turn_classification() {
        use CompassSide::*;
        // The four protected-left movements
        assert_eq!(Turn::classify(North, East), Turn::Left);
        assert_eq!(Turn::classify(West, North), Turn::Left);
        assert_eq!(Turn::classify(South, West), Turn::Left);
        assert_eq!(Turn::classify(East, South), Turn::Left);
        // Opposite sides go straight
        assert_eq!(Turn::classify(South, North), Turn::Straight);
        assert_eq!(Turn::classify(West, East), Turn::Straight);
        // Remaining odd-parity movements are right turns
        assert_eq!(Turn::classify(North, West), Turn::Right);
        assert_eq!(Turn::classify(East, North), Turn::Right);
        assert_eq!(Turn::classify(South, East), Turn::Right);
        assert_eq!(Turn::classify(West, South), Turn::Right);
    }
}
