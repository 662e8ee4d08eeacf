use crate::model::{Incident, ParseEnumError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Sortable incident columns, named by their persisted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "tipo")]
    Kind,
    #[serde(rename = "ubicacion")]
    Location,
    #[serde(rename = "estado")]
    Status,
    #[serde(rename = "fechaHora")]
    Timestamp,
    #[serde(rename = "operador")]
    Operator,
}

impl SortField {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Kind,
        Self::Location,
        Self::Status,
        Self::Timestamp,
        Self::Operator,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Kind => "tipo",
            Self::Location => "ubicacion",
            Self::Status => "estado",
            Self::Timestamp => "fechaHora",
            Self::Operator => "operador",
        }
    }

    const fn alias(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Kind => "type",
            Self::Location => "location",
            Self::Status => "status",
            Self::Timestamp => "time",
            Self::Operator => "operator",
        }
    }

    /// Compare two incidents on this column, ascending.
    ///
    /// Timestamps compare as instants, ids by their leading integer (0 when
    /// there is none), everything else as case-insensitive text.
    #[must_use]
    pub fn compare(self, a: &Incident, b: &Incident) -> Ordering {
        match self {
            Self::Id => numeric_id(&a.id).cmp(&numeric_id(&b.id)),
            Self::Timestamp => a.timestamp.cmp(&b.timestamp),
            Self::Kind => compare_text(a.kind.label(), b.kind.label()),
            Self::Location => compare_text(&a.location, &b.location),
            Self::Status => compare_text(a.status.label(), b.status.label()),
            Self::Operator => compare_text(&a.operator, &b.operator),
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Leading integer of an id, after optional whitespace and sign.
///
/// `"001"` is 1, `"12abc"` is 12, and anything without leading digits is 0.
#[must_use]
pub fn numeric_id(id: &str) -> i64 {
    let trimmed = id.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let mut value: i64 = 0;
    for digit in rest.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'));
    }
    if negative { -value } else { value }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

/// One (column, direction) pair of a multi-column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    #[serde(rename = "key")]
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    #[must_use]
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    #[must_use]
    pub const fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Ordered sort precedence: compare by the first key, fall through on ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    #[must_use]
    pub const fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Column-header click: flip a key already in the spec in place, or
    /// append a new key ascending at the end.
    pub fn toggle(&mut self, field: SortField) {
        if let Some(existing) = self.keys.iter_mut().find(|key| key.field == field) {
            existing.direction = existing.direction.flipped();
        } else {
            self.keys.push(SortKey::asc(field));
        }
    }

    /// Returns a copy with `field` toggled.
    #[must_use]
    pub fn toggled(&self, field: SortField) -> Self {
        let mut next = self.clone();
        next.toggle(field);
        next
    }

    #[must_use]
    pub fn compare(&self, a: &Incident, b: &Incident) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.direction.apply(key.field.compare(a, b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable sort; incidents tied on every key keep their input order.
    pub fn sort(&self, incidents: &mut [&Incident]) {
        if self.keys.is_empty() {
            return;
        }
        incidents.sort_by(|a, b| self.compare(a, b));
    }

    /// Indicator text such as `fechaHora ↓, luego id ↑`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (idx, key) in self.keys.iter().enumerate() {
            if idx > 0 {
                out.push_str(", luego ");
            }
            let _ = write!(out, "{} {}", key.field.key(), key.direction.arrow());
        }
        out
    }
}

impl From<Vec<SortKey>> for SortSpec {
    fn from(keys: Vec<SortKey>) -> Self {
        Self::new(keys)
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| {
                normalized == field.key().to_ascii_lowercase() || normalized == field.alias()
            })
            .ok_or_else(|| ParseEnumError {
                expected: "sort field",
                got: s.to_string(),
            })
    }
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ParseEnumError {
                expected: "sort direction",
                got: s.to_string(),
            }),
        }
    }
}

/// Parses `field` or `field:direction`.
impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((field, direction)) => Ok(Self {
                field: field.parse()?,
                direction: direction.parse()?,
            }),
            None => Ok(Self::asc(s.parse()?)),
        }
    }
}
