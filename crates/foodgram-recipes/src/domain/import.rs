//! Parsing of ingredient catalog files.
//!
//! Two layouts are accepted: CSV with one `name,measurement_unit` pair per
//! line (no header), and a JSON array of
//! `{"name": ..., "measurement_unit": ...}` objects.

use std::path::Path;

use foodgram_core::error::DomainError;
use foodgram_core::repository::NewIngredientRecord;
use serde::Deserialize;

/// Layout of an ingredient catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientFileFormat {
    Csv,
    Json,
}

impl IngredientFileFormat {
    /// Picks the layout from the file extension. Anything that is not
    /// `.json` is read as CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

#[derive(Deserialize)]
struct JsonIngredient {
    name: String,
    measurement_unit: String,
}

/// Parses catalog content into ingredient rows, dropping exact duplicates.
///
/// # Errors
///
/// Returns `DomainError::Validation` naming the first malformed line or the
/// JSON parse error.
pub fn parse_ingredients(
    content: &str,
    format: IngredientFileFormat,
) -> Result<Vec<NewIngredientRecord>, DomainError> {
    let rows = match format {
        IngredientFileFormat::Csv => parse_csv(content)?,
        IngredientFileFormat::Json => parse_json(content)?,
    };

    let mut unique: Vec<NewIngredientRecord> = Vec::with_capacity(rows.len());
    for row in rows {
        if !unique.contains(&row) {
            unique.push(row);
        }
    }
    Ok(unique)
}

fn parse_csv(content: &str) -> Result<Vec<NewIngredientRecord>, DomainError> {
    let mut rows = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Names may contain commas; the unit never does.
        let (name, unit) = line.rsplit_once(',').ok_or_else(|| {
            DomainError::validation(format!("line {}: expected name,measurement_unit", index + 1))
        })?;
        rows.push(row(name, unit, index + 1)?);
    }
    Ok(rows)
}

fn parse_json(content: &str) -> Result<Vec<NewIngredientRecord>, DomainError> {
    let items: Vec<JsonIngredient> = serde_json::from_str(content)
        .map_err(|e| DomainError::validation(format!("invalid ingredient JSON: {e}")))?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| row(&item.name, &item.measurement_unit, index + 1))
        .collect()
}

fn row(name: &str, unit: &str, position: usize) -> Result<NewIngredientRecord, DomainError> {
    let name = name.trim().trim_matches('"').trim();
    let unit = unit.trim().trim_matches('"').trim();
    if name.is_empty() || unit.is_empty() {
        return Err(DomainError::validation(format!(
            "entry {position}: name and measurement unit must not be empty"
        )));
    }
    if name.chars().count() > 250 || unit.chars().count() > 100 {
        return Err(DomainError::validation(format!(
            "entry {position}: name or measurement unit is too long"
        )));
    }
    Ok(NewIngredientRecord {
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
    })
}
