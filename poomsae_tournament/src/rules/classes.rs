//! Belt grades and competition classes.
//!
//! Belt grades are persisted and transmitted as two-character codes
//! (`WH` through `5D`); [`BeltGrade::from_code`] is the single place an
//! unrecognized code turns into an error. Every grade maps to exactly one
//! of four competition classes, ordered `D < C < B < A`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A persisted belt-grade code that is not part of the grade table.
///
/// This signals data-entry corruption upstream; it is never expected in
/// normal operation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown belt grade {code:?}")]
pub struct UnknownGradeError {
    pub code: String,
}

/// The fifteen belt grades, ordered from beginner to 5th Dan.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum BeltGrade {
    #[serde(rename = "WH")]
    White,
    #[serde(rename = "WY")]
    WhiteYellow,
    #[serde(rename = "YE")]
    Yellow,
    #[serde(rename = "YG")]
    YellowGreen,
    #[serde(rename = "GR")]
    Green,
    #[serde(rename = "GB")]
    GreenBlue,
    #[serde(rename = "BL")]
    Blue,
    #[serde(rename = "BR")]
    BlueRed,
    #[serde(rename = "RE")]
    Red,
    #[serde(rename = "RB")]
    RedBlack,
    #[serde(rename = "1D")]
    FirstDan,
    #[serde(rename = "2D")]
    SecondDan,
    #[serde(rename = "3D")]
    ThirdDan,
    #[serde(rename = "4D")]
    FourthDan,
    #[serde(rename = "5D")]
    FifthDan,
}

impl BeltGrade {
    /// All grades, in rank order.
    pub const ALL: [BeltGrade; 15] = [
        BeltGrade::White,
        BeltGrade::WhiteYellow,
        BeltGrade::Yellow,
        BeltGrade::YellowGreen,
        BeltGrade::Green,
        BeltGrade::GreenBlue,
        BeltGrade::Blue,
        BeltGrade::BlueRed,
        BeltGrade::Red,
        BeltGrade::RedBlack,
        BeltGrade::FirstDan,
        BeltGrade::SecondDan,
        BeltGrade::ThirdDan,
        BeltGrade::FourthDan,
        BeltGrade::FifthDan,
    ];

    /// Wire codes, index-aligned with [`BeltGrade::ALL`].
    pub const CODES: [&'static str; 15] = [
        "WH", "WY", "YE", "YG", "GR", "GB", "BL", "BR", "RE", "RB", "1D", "2D", "3D", "4D", "5D",
    ];

    /// The two-character code this grade is persisted as.
    pub fn code(self) -> &'static str {
        Self::CODES[self as usize]
    }

    /// Parse a persisted two-character code.
    pub fn from_code(code: &str) -> Result<Self, UnknownGradeError> {
        Self::ALL
            .iter()
            .find(|grade| grade.code() == code)
            .copied()
            .ok_or_else(|| UnknownGradeError {
                code: code.to_string(),
            })
    }
}

impl fmt::Display for BeltGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One of the four skill tiers teams compete in.
///
/// Declaration order is the competitive order, so the derived `Ord`
/// gives `D < C < B < A`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CompetitionClass {
    D,
    C,
    B,
    A,
}

impl CompetitionClass {
    /// All classes, lowest tier first.
    pub const ALL: [CompetitionClass; 4] = [
        CompetitionClass::D,
        CompetitionClass::C,
        CompetitionClass::B,
        CompetitionClass::A,
    ];

    /// Ordinal level, 1 (D) through 4 (A).
    pub fn level(self) -> u8 {
        match self {
            CompetitionClass::D => 1,
            CompetitionClass::C => 2,
            CompetitionClass::B => 3,
            CompetitionClass::A => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CompetitionClass::D => "D-Class",
            CompetitionClass::C => "C-Class",
            CompetitionClass::B => "B-Class",
            CompetitionClass::A => "A-Class",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CompetitionClass::D => "white to white-yellow",
            CompetitionClass::C => "yellow to green-blue",
            CompetitionClass::B => "blue to red-black",
            CompetitionClass::A => "1st Dan and up",
        }
    }
}

impl fmt::Display for CompetitionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a belt grade to its competition class.
///
/// Total over the grade enumeration; the `match` makes the table part of
/// the compile.
pub fn classify(grade: BeltGrade) -> CompetitionClass {
    use BeltGrade::*;
    match grade {
        White | WhiteYellow => CompetitionClass::D,
        Yellow | YellowGreen | Green | GreenBlue => CompetitionClass::C,
        Blue | BlueRed | Red | RedBlack => CompetitionClass::B,
        FirstDan | SecondDan | ThirdDan | FourthDan | FifthDan => CompetitionClass::A,
    }
}

/// Compute a team's class from its members' persisted grade codes.
///
/// A team competes at the **highest** class among its members, so a
/// mixed-skill team faces the harder bracket. An empty iterator yields
/// `D`; the pool builder rejects empty teams before this matters.
pub fn team_class<'a, I>(grade_codes: I) -> Result<CompetitionClass, UnknownGradeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut class = CompetitionClass::D;
    for code in grade_codes {
        let grade = BeltGrade::from_code(code)?;
        class = class.max(classify(grade));
    }
    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_total_and_matches_the_grade_table() {
        let expected = [
            (BeltGrade::White, CompetitionClass::D),
            (BeltGrade::WhiteYellow, CompetitionClass::D),
            (BeltGrade::Yellow, CompetitionClass::C),
            (BeltGrade::YellowGreen, CompetitionClass::C),
            (BeltGrade::Green, CompetitionClass::C),
            (BeltGrade::GreenBlue, CompetitionClass::C),
            (BeltGrade::Blue, CompetitionClass::B),
            (BeltGrade::BlueRed, CompetitionClass::B),
            (BeltGrade::Red, CompetitionClass::B),
            (BeltGrade::RedBlack, CompetitionClass::B),
            (BeltGrade::FirstDan, CompetitionClass::A),
            (BeltGrade::SecondDan, CompetitionClass::A),
            (BeltGrade::ThirdDan, CompetitionClass::A),
            (BeltGrade::FourthDan, CompetitionClass::A),
            (BeltGrade::FifthDan, CompetitionClass::A),
        ];
        assert_eq!(expected.len(), BeltGrade::ALL.len());
        for (grade, class) in expected {
            assert_eq!(classify(grade), class, "grade {grade}");
        }
    }

    #[test]
    fn test_classes_are_totally_ordered() {
        assert!(CompetitionClass::D < CompetitionClass::C);
        assert!(CompetitionClass::C < CompetitionClass::B);
        assert!(CompetitionClass::B < CompetitionClass::A);
        assert_eq!(
            CompetitionClass::ALL.map(CompetitionClass::level),
            [1, 2, 3, 4]
        );
    }

    #[test]
    fn test_grade_codes_round_trip() {
        for grade in BeltGrade::ALL {
            assert_eq!(BeltGrade::from_code(grade.code()), Ok(grade));
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = BeltGrade::from_code("ZZ").unwrap_err();
        assert_eq!(err.code, "ZZ");
        // Codes are case-sensitive, like the original data entry format.
        assert!(BeltGrade::from_code("wh").is_err());
        assert!(BeltGrade::from_code("").is_err());
    }

    #[test]
    fn test_grade_serde_uses_wire_codes() {
        let json = serde_json::to_string(&BeltGrade::FirstDan).unwrap();
        assert_eq!(json, "\"1D\"");
        let grade: BeltGrade = serde_json::from_str("\"GB\"").unwrap();
        assert_eq!(grade, BeltGrade::GreenBlue);
        assert!(serde_json::from_str::<BeltGrade>("\"ZZ\"").is_err());
    }

    #[test]
    fn test_team_class_takes_the_maximum() {
        let class = team_class(["WH", "3D", "YE"]).unwrap();
        assert_eq!(class, CompetitionClass::A);

        let class = team_class(["GR", "WH"]).unwrap();
        assert_eq!(class, CompetitionClass::C);
    }

    #[test]
    fn test_team_class_single_member() {
        for grade in BeltGrade::ALL {
            assert_eq!(team_class([grade.code()]).unwrap(), classify(grade));
        }
    }

    #[test]
    fn test_team_class_propagates_unknown_grades() {
        let err = team_class(["WH", "??", "1D"]).unwrap_err();
        assert_eq!(err.code, "??");
    }
}
