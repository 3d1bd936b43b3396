//! Subject record built from one form submission

use std::fmt;

use crate::{ModelError, Result};

/// Feature names in the column order the classifier was trained on
pub const FEATURE_NAMES: [&str; 4] = ["RACE", "BMI", "AGE", "C4_0"];

/// Race/ethnicity code as recorded in the training survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Race {
    MexicanAmerican = 1,
    OtherHispanic = 2,
    NonHispanicWhite = 3,
    NonHispanicBlack = 4,
    OtherRace = 5,
}

impl Race {
    /// All codes in select-box order
    pub const ALL: [Race; 5] = [
        Race::MexicanAmerican,
        Race::OtherHispanic,
        Race::NonHispanicWhite,
        Race::NonHispanicBlack,
        Race::OtherRace,
    ];

    /// Numeric code fed to the model (1..=5)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Race::MexicanAmerican => "Mexican American",
            Race::OtherHispanic => "Other Hispanic",
            Race::NonHispanicWhite => "Non-Hispanic White",
            Race::NonHispanicBlack => "Non-Hispanic Black",
            Race::OtherRace => "Other race",
        }
    }
}

impl TryFrom<i64> for Race {
    type Error = i64;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(Race::MexicanAmerican),
            2 => Ok(Race::OtherHispanic),
            3 => Ok(Race::NonHispanicWhite),
            4 => Ok(Race::NonHispanicBlack),
            5 => Ok(Race::OtherRace),
            other => Err(other),
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One person's inputs. Lives for a single request.
///
/// No domain checks are applied: a BMI of 0 or an age of 200 is passed to
/// the model unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subject {
    pub race: Race,
    /// kg/m^2
    pub bmi: f64,
    /// years
    pub age: f64,
    /// dietary C4:0 fatty acid intake, g/day
    pub fatty_acid_intake: f64,
}

impl Default for Subject {
    fn default() -> Self {
        Self {
            race: Race::NonHispanicBlack,
            bmi: 24.51,
            age: 48.0,
            fatty_acid_intake: 2.411,
        }
    }
}

impl Subject {
    /// Values in `FEATURE_NAMES` order
    pub fn canonical_row(&self) -> [f64; 4] {
        [
            f64::from(self.race.code()),
            self.bmi,
            self.age,
            self.fatty_acid_intake,
        ]
    }

    /// Lay the subject out in the model's feature order.
    ///
    /// A model naming each of the four known columns exactly once is matched
    /// by name. A four-feature model with none of the known names (e.g.
    /// `Column_0`..`Column_3`) is fed positionally. Any other naming is an
    /// error.
    pub fn feature_row(&self, feature_names: &[String]) -> Result<Vec<f64>> {
        if feature_names.len() != FEATURE_NAMES.len() {
            return Err(ModelError::ShapeMismatch {
                expected: feature_names.len(),
                actual: FEATURE_NAMES.len(),
            });
        }

        let canonical = self.canonical_row();
        let positions: Vec<Option<usize>> = feature_names
            .iter()
            .map(|name| FEATURE_NAMES.iter().position(|known| known == name))
            .collect();

        if positions.iter().all(Option::is_none) {
            return Ok(canonical.to_vec());
        }

        let mut seen = [false; FEATURE_NAMES.len()];
        let mut row = Vec::with_capacity(canonical.len());
        for position in positions {
            match position {
                Some(i) if !seen[i] => {
                    seen[i] = true;
                    row.push(canonical[i]);
                }
                _ => return Err(ModelError::FeatureNames(feature_names.to_vec())),
            }
        }

        Ok(row)
    }
}
