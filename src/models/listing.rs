use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FieldError;

/// Идентификатор строки инвентаря (одного объявления о продаже билетов).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    Clone,
    Published,
}

/// Одна строка таблицы инвентаря продавца.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: RowId,
    pub quantity: u32,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub row_label: String,
    #[serde(default)]
    pub notes: String,
    /// Строка создана копированием другого объявления и ещё не опубликована отдельно.
    pub is_cloned: bool,
    pub status: ListingStatus,
}

impl InventoryRow {
    pub fn apply(&mut self, field: ListingField, value: &FieldValue) {
        match (field, value) {
            (ListingField::Quantity, FieldValue::Quantity(q)) => self.quantity = *q,
            (ListingField::Price, FieldValue::Price(p)) => self.price = *p,
            (ListingField::Category, FieldValue::Text(s)) => self.category = s.clone(),
            (ListingField::Section, FieldValue::Text(s)) => self.section = s.clone(),
            (ListingField::RowLabel, FieldValue::Text(s)) => self.row_label = s.clone(),
            (ListingField::Notes, FieldValue::Text(s)) => self.notes = s.clone(),
            // FieldValue создаётся только через ListingField::parse, виды всегда совпадают.
            _ => {}
        }
    }

    pub fn apply_all(&mut self, changes: &FieldChanges) {
        for (field, value) in changes {
            self.apply(*field, value);
        }
    }
}

/// Поля объявления, доступные для (массового) редактирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingField {
    Quantity,
    Price,
    Category,
    Section,
    RowLabel,
    Notes,
}

impl ListingField {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingField::Quantity => "quantity",
            ListingField::Price => "price",
            ListingField::Category => "category",
            ListingField::Section => "section",
            ListingField::RowLabel => "row_label",
            ListingField::Notes => "notes",
        }
    }

    /// Разбирает сырой ввод из формы в типизированное значение поля.
    pub fn parse(self, raw: &str) -> Result<FieldValue, FieldError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| FieldError::InvalidValue {
            field: self.as_str(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ListingField::Quantity => {
                let q: u32 = trimmed.parse().map_err(|_| invalid("expected a whole number"))?;
                if q == 0 {
                    return Err(invalid("quantity must be at least 1"));
                }
                Ok(FieldValue::Quantity(q))
            }
            ListingField::Price => {
                let p: f64 = trimmed.parse().map_err(|_| invalid("expected a number"))?;
                if !p.is_finite() || p < 0.0 {
                    return Err(invalid("price must be a non-negative amount"));
                }
                Ok(FieldValue::Price(p))
            }
            ListingField::Category => {
                if trimmed.is_empty() {
                    return Err(invalid("category cannot be empty"));
                }
                Ok(FieldValue::Text(trimmed.to_string()))
            }
            ListingField::Section | ListingField::RowLabel | ListingField::Notes => {
                Ok(FieldValue::Text(trimmed.to_string()))
            }
        }
    }
}

impl fmt::Display for ListingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quantity" => Ok(ListingField::Quantity),
            "price" => Ok(ListingField::Price),
            "category" => Ok(ListingField::Category),
            "section" => Ok(ListingField::Section),
            "row_label" | "row" => Ok(ListingField::RowLabel),
            "notes" => Ok(ListingField::Notes),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Quantity(u32),
    Price(f64),
    Text(String),
}

/// Общий набор изменений: одно значение на поле, применяется ко всем выделенным строкам.
pub type FieldChanges = std::collections::BTreeMap<ListingField, FieldValue>;

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> InventoryRow {
        InventoryRow {
            id: RowId(1),
            quantity: 2,
            price: 120.0,
            category: "VIP".into(),
            section: "A".into(),
            row_label: "3".into(),
            notes: String::new(),
            is_cloned: false,
            status: ListingStatus::Draft,
        }
    }

    #[test]
    fn parses_known_fields() {
        assert_eq!("price".parse::<ListingField>().unwrap(), ListingField::Price);
        assert_eq!("row".parse::<ListingField>().unwrap(), ListingField::RowLabel);
        assert!(matches!(
            "colour".parse::<ListingField>(),
            Err(FieldError::UnknownField(f)) if f == "colour"
        ));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(ListingField::Quantity.parse("0").is_err());
        assert!(ListingField::Quantity.parse("two").is_err());
        assert!(ListingField::Price.parse("-1").is_err());
        assert!(ListingField::Price.parse("NaN").is_err());
        assert!(ListingField::Category.parse("   ").is_err());
        assert_eq!(ListingField::Notes.parse("").unwrap(), FieldValue::Text(String::new()));
    }

    #[test]
    fn apply_changes_only_touches_named_fields() {
        let mut r = row();
        let mut changes = FieldChanges::new();
        changes.insert(ListingField::Price, ListingField::Price.parse("50").unwrap());
        r.apply_all(&changes);

        assert_eq!(r.price, 50.0);
        assert_eq!(r.quantity, 2);
        assert_eq!(r.category, "VIP");
    }

    #[test]
    fn row_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&row()).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"status\":\"draft\""));
    }
}
