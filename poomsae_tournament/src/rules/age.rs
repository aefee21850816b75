//! Age-bracket tables.
//!
//! Per-pool-type contiguous age ranges. The tables are configuration the
//! pool builder does not consult yet: age is not an axis of the candidate
//! grid, so the lookup lives here, pluggable, until it is.

use crate::tournament::models::PoolType;

/// A closed age range, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgeBracket {
    pub min_age: u8,
    pub max_age: u8,
}

impl AgeBracket {
    pub const fn new(min_age: u8, max_age: u8) -> Self {
        Self { min_age, max_age }
    }

    pub fn contains(self, age: u8) -> bool {
        self.min_age <= age && age <= self.max_age
    }
}

pub const SOLO_BRACKETS: [AgeBracket; 10] = [
    AgeBracket::new(0, 8),
    AgeBracket::new(9, 11),
    AgeBracket::new(12, 14),
    AgeBracket::new(15, 17),
    AgeBracket::new(18, 30),
    AgeBracket::new(31, 40),
    AgeBracket::new(41, 50),
    AgeBracket::new(51, 60),
    AgeBracket::new(61, 65),
    AgeBracket::new(66, 100),
];

pub const PAIR_BRACKETS: [AgeBracket; 5] = [
    AgeBracket::new(0, 11),
    AgeBracket::new(12, 14),
    AgeBracket::new(15, 17),
    AgeBracket::new(18, 30),
    AgeBracket::new(31, 100),
];

pub const TEAM_BRACKETS: [AgeBracket; 5] = [
    AgeBracket::new(0, 11),
    AgeBracket::new(12, 14),
    AgeBracket::new(15, 17),
    AgeBracket::new(18, 30),
    AgeBracket::new(31, 100),
];

/// The age subdivision a pool type would use.
pub fn brackets_for(pool_type: PoolType) -> &'static [AgeBracket] {
    match pool_type {
        PoolType::Solo => &SOLO_BRACKETS,
        PoolType::Pair => &PAIR_BRACKETS,
        PoolType::Team => &TEAM_BRACKETS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_are_contiguous_and_cover_all_ages() {
        for pool_type in [PoolType::Solo, PoolType::Pair, PoolType::Team] {
            let brackets = brackets_for(pool_type);
            assert_eq!(brackets.first().unwrap().min_age, 0);
            assert_eq!(brackets.last().unwrap().max_age, 100);
            for pair in brackets.windows(2) {
                assert_eq!(
                    pair[1].min_age,
                    pair[0].max_age + 1,
                    "gap or overlap in {pool_type:?} brackets"
                );
            }
        }
    }

    #[test]
    fn test_contains_is_inclusive_on_both_ends() {
        let bracket = AgeBracket::new(18, 30);
        assert!(!bracket.contains(17));
        assert!(bracket.contains(18));
        assert!(bracket.contains(30));
        assert!(!bracket.contains(31));
    }

    #[test]
    fn test_every_age_maps_to_exactly_one_bracket() {
        for age in 0..=100u8 {
            for pool_type in [PoolType::Solo, PoolType::Pair, PoolType::Team] {
                let hits = brackets_for(pool_type)
                    .iter()
                    .filter(|b| b.contains(age))
                    .count();
                assert_eq!(hits, 1, "age {age} in {pool_type:?}");
            }
        }
    }
}
