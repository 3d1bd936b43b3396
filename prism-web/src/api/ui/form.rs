//! Form fields and their type validation

use prism_model::{Race, Subject};
use serde::Deserialize;

use crate::error::PageError;

/// Which button submitted the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormAction {
    #[default]
    Submit,
    Reset,
}

impl FormAction {
    /// `reset` resets; anything else, including no value, submits.
    pub fn from_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("reset") {
            FormAction::Reset
        } else {
            FormAction::Submit
        }
    }
}

/// Raw `application/x-www-form-urlencoded` body of `POST /`
///
/// Field names match the model's feature names. Absent fields arrive as
/// empty strings and fail validation.
#[derive(Debug, Clone, Deserialize)]
pub struct FormSubmission {
    #[serde(rename = "RACE", default)]
    pub race: String,
    #[serde(rename = "BMI", default)]
    pub bmi: String,
    #[serde(rename = "AGE", default)]
    pub age: String,
    #[serde(rename = "C4_0", default)]
    pub c4_0: String,
    #[serde(default)]
    pub action: String,
}

impl FormSubmission {
    pub fn action(&self) -> FormAction {
        FormAction::from_value(&self.action)
    }

    pub fn values(&self) -> FormValues {
        FormValues {
            race: self.race.trim().to_string(),
            bmi: self.bmi.trim().to_string(),
            age: self.age.trim().to_string(),
            c4_0: self.c4_0.trim().to_string(),
        }
    }
}

/// Field contents as shown in the form, exactly as entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub race: String,
    pub bmi: String,
    pub age: String,
    pub c4_0: String,
}

impl Default for FormValues {
    fn default() -> Self {
        Self::from(&Subject::default())
    }
}

impl From<&Subject> for FormValues {
    fn from(subject: &Subject) -> Self {
        Self {
            race: subject.race.to_string(),
            bmi: subject.bmi.to_string(),
            age: subject.age.to_string(),
            c4_0: subject.fatty_acid_intake.to_string(),
        }
    }
}

impl FormValues {
    /// Type-check every field and build the subject.
    ///
    /// Only types are checked. Any finite number is accepted for BMI, age
    /// and intake, however implausible.
    pub fn parse(&self) -> Result<Subject, PageError> {
        let race = self
            .selected_race()
            .ok_or_else(|| self.invalid("RACE", "must be one of the codes 1, 2, 3, 4, 5"))?;

        Ok(Subject {
            race,
            bmi: self.number("BMI", &self.bmi)?,
            age: self.number("AGE", &self.age)?,
            fatty_acid_intake: self.number("C4_0", &self.c4_0)?,
        })
    }

    fn number(&self, field: &'static str, text: &str) -> Result<f64, PageError> {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.invalid(field, "must be a number")),
        }
    }

    fn invalid(&self, field: &'static str, message: &str) -> PageError {
        PageError::BadInput {
            field,
            message: message.to_string(),
            form: self.clone(),
        }
    }

    /// Race code currently selected, if the field holds a valid one
    pub fn selected_race(&self) -> Option<Race> {
        self.race
            .parse::<i64>()
            .ok()
            .and_then(|code| Race::try_from(code).ok())
    }
}
