use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenderError {
    #[error("no such gender defined: {0}")]
    UnknownGender(String),
    #[error("unknown gender field: {0}")]
    UnknownField(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// The pronoun and noun forms copied onto generated entities.
///
/// Each form is a word list so that programs can override a form with
/// several alternatives through `REFGENDER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronouns {
    /// Subject form: "she", "he", "they", "it".
    pub heshe: Vec<String>,
    /// Object form: "her", "him", "them", "it".
    pub himher: Vec<String>,
    /// Possessive determiner: "her", "his", "their", "its".
    pub hisher: Vec<String>,
    /// Noun: "woman", "man", "person", "robot".
    pub manwoman: Vec<String>,
    /// Past tense of "to be": "was" or "were".
    pub waswere: Vec<String>,
    /// Present tense of "to be": "is" or "are".
    pub isare: Vec<String>,
}

impl Pronouns {
    /// Field names, in the order they are written onto entities.
    pub const FIELDS: [&'static str; 6] = ["heshe", "hisher", "himher", "manwoman", "waswere", "isare"];

    fn from_forms(forms: [&str; 6]) -> Self {
        let [heshe, himher, hisher, manwoman, waswere, isare] = forms.map(|s| vec![s.to_string()]);
        Self {
            heshe,
            himher,
            hisher,
            manwoman,
            waswere,
            isare,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Vec<String>> {
        match name {
            "heshe" => Some(&self.heshe),
            "himher" => Some(&self.himher),
            "hisher" => Some(&self.hisher),
            "manwoman" => Some(&self.manwoman),
            "waswere" => Some(&self.waswere),
            "isare" => Some(&self.isare),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match name {
            "heshe" => Some(&mut self.heshe),
            "himher" => Some(&mut self.himher),
            "hisher" => Some(&mut self.hisher),
            "manwoman" => Some(&mut self.manwoman),
            "waswere" => Some(&mut self.waswere),
            "isare" => Some(&mut self.isare),
            _ => None,
        }
    }
}

/// A name pool plus pronoun forms for one gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderProfile {
    pub names: Vec<String>,
    pub pronouns: Pronouns,
}

impl GenderProfile {
    fn new(names: &[&str], pronouns: Pronouns) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            pronouns,
        }
    }
}

/// All gender definitions, plus the named sets a `GEN` block may request
/// (`binary`, `human`, `all`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderCatalog {
    pub profiles: BTreeMap<String, GenderProfile>,
    pub sets: BTreeMap<String, Vec<String>>,
}

impl Default for GenderCatalog {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "female".to_string(),
            GenderProfile::new(
                &[
                    "Ann", "Kayleen", "Marianna", "Roselyn", "Alisa", "Nathalia", "Mylee", "Theresa",
                    "Damaris", "Audriana", "Carina", "Pearl", "Mina",
                ],
                Pronouns::from_forms(["she", "her", "her", "woman", "was", "is"]),
            ),
        );
        profiles.insert(
            "male".to_string(),
            GenderProfile::new(
                &[
                    "Lionel", "Alfred", "Lennon", "Theo", "Mervyn", "Trystan", "Antwan", "Ross",
                    "Leroy", "Nigel", "Darien", "Keon", "Vaughn",
                ],
                Pronouns::from_forms(["he", "him", "his", "man", "was", "is"]),
            ),
        );
        profiles.insert(
            "nonbinary".to_string(),
            GenderProfile::new(
                &[
                    "Verv", "Stanter", "Ilme", "Apri", "Canter", "Elm", "Valor", "Rallyum", "Rune",
                    "Umbra", "Vio", "Xap", "Zylith",
                ],
                Pronouns::from_forms(["they", "them", "their", "person", "were", "are"]),
            ),
        );
        profiles.insert(
            "robot".to_string(),
            GenderProfile::new(
                &[
                    "Splasher", "Sprocket", "Gear", "Equilateral", "Solver", "Cruncher", "Isosceles",
                    "Lambda", "Divisor", "Calculus", "Enumerator", "Sensor", "Denominator",
                ],
                Pronouns::from_forms(["it", "it", "its", "robot", "was", "is"]),
            ),
        );

        let set = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let mut sets = BTreeMap::new();
        sets.insert("male".to_string(), set(&["male"]));
        sets.insert("female".to_string(), set(&["female"]));
        sets.insert("nonbinary".to_string(), set(&["nonbinary"]));
        sets.insert("robot".to_string(), set(&["robot"]));
        sets.insert("binary".to_string(), set(&["female", "male"]));
        sets.insert("human".to_string(), set(&["female", "male", "nonbinary"]));
        sets.insert("all".to_string(), set(&["female", "male", "nonbinary", "robot"]));

        Self { profiles, sets }
    }
}

impl GenderCatalog {
    pub fn profile(&self, gender: &str) -> Option<&GenderProfile> {
        self.profiles.get(gender)
    }

    /// The genders a `GEN` block may draw from for a requested set name.
    pub fn set(&self, name: &str) -> Option<&[String]> {
        self.sets.get(name).map(|v| v.as_slice())
    }

    /// Override one field of one gender: `names` or a pronoun form.
    pub fn override_field(
        &mut self,
        gender: &str,
        field: &str,
        value: Vec<String>,
    ) -> Result<(), GenderError> {
        let profile = self
            .profiles
            .get_mut(gender)
            .ok_or_else(|| GenderError::UnknownGender(gender.to_string()))?;
        if field == "names" {
            profile.names = value;
            return Ok(());
        }
        let slot = profile
            .pronouns
            .field_mut(field)
            .ok_or_else(|| GenderError::UnknownField(field.to_string()))?;
        *slot = value;
        Ok(())
    }

    /// Load a gender catalog from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GenderCatalog, GenderError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<GenderCatalog, GenderError> {
        Ok(ron::from_str(input)?)
    }
}
