//! Column resolution for arbitrarily-headed sheets.
//!
//! Operators name their columns however they like (`Pozo`, `WELL NAME`, `prof_desde (m)`). Each
//! logical field carries an ordered synonym list; a header matches a synonym when, after trimming
//! and lower-casing, it equals the synonym or contains it.

use std::fmt;

/// The four logical fields of a drilling event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Well,
    Depth,
    Subcategory,
    Comment,
}

impl LogicalField {
    /// All fields, in resolution order.
    pub const ALL: [LogicalField; 4] = [
        LogicalField::Well,
        LogicalField::Depth,
        LogicalField::Subcategory,
        LogicalField::Comment,
    ];
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Well => "well",
            Self::Depth => "depth",
            Self::Subcategory => "subcategory",
            Self::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// A logical field plus its header synonyms, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: LogicalField,
    /// Lower-case synonyms. Earlier entries win over later ones.
    pub synonyms: Vec<String>,
}

impl FieldSpec {
    /// Create a spec; synonyms are trimmed and lower-cased.
    pub fn new<I, S>(field: LogicalField, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            field,
            synonyms: synonyms
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Built-in synonyms for `field`.
    pub fn default_for(field: LogicalField) -> Self {
        match field {
            LogicalField::Well => Self::new(field, ["pozo", "well", "nombre"]),
            LogicalField::Depth => Self::new(field, ["prof_desde", "depth", "md", "profundidad"]),
            LogicalField::Subcategory => Self::new(
                field,
                ["subcategoria_npt", "subcategoria", "sub_categoria", "detalle_npt"],
            ),
            LogicalField::Comment => Self::new(
                field,
                ["comentario", "comment", "observaciones", "descripcion"],
            ),
        }
    }
}

/// The full set of field specs used by a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpecs {
    pub well: FieldSpec,
    pub depth: FieldSpec,
    pub subcategory: FieldSpec,
    pub comment: FieldSpec,
}

impl FieldSpecs {
    /// Spec for a logical field.
    pub fn get(&self, field: LogicalField) -> &FieldSpec {
        match field {
            LogicalField::Well => &self.well,
            LogicalField::Depth => &self.depth,
            LogicalField::Subcategory => &self.subcategory,
            LogicalField::Comment => &self.comment,
        }
    }

    /// Replace the spec for `spec.field`.
    pub fn with(mut self, spec: FieldSpec) -> Self {
        match spec.field {
            LogicalField::Well => self.well = spec,
            LogicalField::Depth => self.depth = spec,
            LogicalField::Subcategory => self.subcategory = spec,
            LogicalField::Comment => self.comment = spec,
        }
        self
    }
}

impl Default for FieldSpecs {
    fn default() -> Self {
        Self {
            well: FieldSpec::default_for(LogicalField::Well),
            depth: FieldSpec::default_for(LogicalField::Depth),
            subcategory: FieldSpec::default_for(LogicalField::Subcategory),
            comment: FieldSpec::default_for(LogicalField::Comment),
        }
    }
}

/// Find the header key that best matches `spec`.
///
/// Synonyms are tried in order. For each synonym, a key equal to it wins over a key merely
/// containing it; among equally good keys the first in row order wins. Returns the key with its
/// original spelling.
pub fn resolve_field<'a, I>(keys: I, spec: &FieldSpec) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: Vec<(&str, String)> = keys
        .into_iter()
        .map(|k| (k, k.trim().to_lowercase()))
        .collect();

    for synonym in &spec.synonyms {
        let exact = normalized.iter().find(|(_, n)| n == synonym);
        let containing = || normalized.iter().find(|(_, n)| n.contains(synonym.as_str()));
        if let Some((key, _)) = exact.or_else(containing) {
            return Some(*key);
        }
    }
    None
}

/// Resolved header key per logical field for one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pub well: Option<String>,
    pub depth: Option<String>,
    pub subcategory: Option<String>,
    pub comment: Option<String>,
}

impl FieldMapping {
    /// Resolve every logical field against one row's header keys.
    pub fn resolve<'a, I>(keys: I, specs: &FieldSpecs) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys: Vec<&str> = keys.into_iter().collect();
        let find = |field| resolve_field(keys.iter().copied(), specs.get(field)).map(str::to_string);

        Self {
            well: find(LogicalField::Well),
            depth: find(LogicalField::Depth),
            subcategory: find(LogicalField::Subcategory),
            comment: find(LogicalField::Comment),
        }
    }

    /// The resolved key for `field`, if any.
    pub fn key_for(&self, field: LogicalField) -> Option<&str> {
        match field {
            LogicalField::Well => self.well.as_deref(),
            LogicalField::Depth => self.depth.as_deref(),
            LogicalField::Subcategory => self.subcategory.as_deref(),
            LogicalField::Comment => self.comment.as_deref(),
        }
    }

    /// Logical fields with no matching header.
    pub fn missing(&self) -> Vec<LogicalField> {
        LogicalField::ALL
            .into_iter()
            .filter(|f| self.key_for(*f).is_none())
            .collect()
    }
}
