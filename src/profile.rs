//! Equipment profile collected before the dialogue starts.
//!
//! A session cannot ask questions until all five profile fields are known:
//! equipment type, fuel type, brand, model, and year. Fields arrive one at a
//! time (the transport layer submits them as the user picks from selection
//! menus), each may be set exactly once, and unknown field names are
//! rejected up front rather than discovered later as missing keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::DiagError;

/// Delimiter joining profile fields into a document key.
const KEY_DELIMITER: &str = "_";

/// The five required profile fields, in submission-agnostic order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    EquipmentType,
    FuelType,
    Brand,
    Model,
    Year,
}

impl ProfileField {
    /// All fields, used to report what is still missing.
    pub const ALL: [ProfileField; 5] = [
        ProfileField::EquipmentType,
        ProfileField::FuelType,
        ProfileField::Brand,
        ProfileField::Model,
        ProfileField::Year,
    ];

    /// The wire name of the field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::EquipmentType => "equipmentType",
            ProfileField::FuelType => "fuelType",
            ProfileField::Brand => "brand",
            ProfileField::Model => "model",
            ProfileField::Year => "year",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = DiagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equipmentType" => Ok(ProfileField::EquipmentType),
            "fuelType" => Ok(ProfileField::FuelType),
            "brand" => Ok(ProfileField::Brand),
            "model" => Ok(ProfileField::Model),
            "year" => Ok(ProfileField::Year),
            other => Err(DiagError::InvalidField {
                field: other.to_string(),
                reason: "not one of the five required profile fields".to_string(),
            }),
        }
    }
}

/// A profile under construction: each field settable exactly once.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileDraft {
    equipment_type: Option<String>,
    fuel_type: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    year: Option<String>,
}

impl ProfileDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one field. Fails if the field was already submitted.
    ///
    /// Returns the completed [`EquipmentProfile`] once the final field lands,
    /// `None` while fields are still missing.
    pub fn submit(
        &mut self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<Option<EquipmentProfile>, DiagError> {
        let slot = match field {
            ProfileField::EquipmentType => &mut self.equipment_type,
            ProfileField::FuelType => &mut self.fuel_type,
            ProfileField::Brand => &mut self.brand,
            ProfileField::Model => &mut self.model,
            ProfileField::Year => &mut self.year,
        };
        if slot.is_some() {
            return Err(DiagError::InvalidField {
                field: field.to_string(),
                reason: "field already set".to_string(),
            });
        }
        *slot = Some(value.into());
        Ok(self.complete())
    }

    /// Fields not yet submitted.
    #[must_use]
    pub fn missing(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| match field {
                ProfileField::EquipmentType => self.equipment_type.is_none(),
                ProfileField::FuelType => self.fuel_type.is_none(),
                ProfileField::Brand => self.brand.is_none(),
                ProfileField::Model => self.model.is_none(),
                ProfileField::Year => self.year.is_none(),
            })
            .collect()
    }

    /// The completed profile, if all five fields are present.
    #[must_use]
    pub fn complete(&self) -> Option<EquipmentProfile> {
        Some(EquipmentProfile {
            equipment_type: self.equipment_type.clone()?,
            fuel_type: self.fuel_type.clone()?,
            brand: self.brand.clone()?,
            model: self.model.clone()?,
            year: self.year.clone()?,
        })
    }
}

/// A fully specified equipment profile.
///
/// Construction goes through [`ProfileDraft`]; once built, every field is
/// guaranteed present and the profile is immutable for the session's life.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentProfile {
    pub equipment_type: String,
    pub fuel_type: String,
    pub brand: String,
    pub model: String,
    pub year: String,
}

impl EquipmentProfile {
    /// Deterministic key identifying the reference document for this
    /// profile: `brand_model_year_fuel`.
    #[must_use]
    pub fn document_key(&self) -> String {
        [
            self.brand.as_str(),
            self.model.as_str(),
            self.year.as_str(),
            self.fuel_type.as_str(),
        ]
        .join(KEY_DELIMITER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_draft() -> ProfileDraft {
        let mut draft = ProfileDraft::new();
        draft.submit(ProfileField::EquipmentType, "car").unwrap();
        draft.submit(ProfileField::FuelType, "petrol").unwrap();
        draft.submit(ProfileField::Brand, "Tata").unwrap();
        draft.submit(ProfileField::Model, "Nexon").unwrap();
        draft
    }

    #[test]
    fn completes_on_fifth_field() {
        let mut draft = filled_draft();
        assert_eq!(draft.missing(), vec![ProfileField::Year]);
        let profile = draft
            .submit(ProfileField::Year, "2020")
            .unwrap()
            .expect("profile should be complete");
        assert_eq!(profile.brand, "Tata");
        assert!(draft.missing().is_empty());
    }

    #[test]
    fn rejects_duplicate_field() {
        let mut draft = filled_draft();
        let err = draft.submit(ProfileField::Brand, "Mahindra").unwrap_err();
        assert!(matches!(err, DiagError::InvalidField { field, .. } if field == "brand"));
    }

    #[test]
    fn rejects_unknown_field_name() {
        let err = "color".parse::<ProfileField>().unwrap_err();
        assert!(matches!(err, DiagError::InvalidField { field, .. } if field == "color"));
        assert_eq!("fuelType".parse::<ProfileField>().unwrap(), ProfileField::FuelType);
    }

    #[test]
    fn document_key_joins_with_underscores() {
        let mut draft = filled_draft();
        let profile = draft.submit(ProfileField::Year, "2020").unwrap().unwrap();
        assert_eq!(profile.document_key(), "Tata_Nexon_2020_petrol");
    }

    #[test]
    fn incomplete_draft_has_no_profile() {
        let draft = ProfileDraft::new();
        assert!(draft.complete().is_none());
        assert_eq!(draft.missing().len(), 5);
    }
}
