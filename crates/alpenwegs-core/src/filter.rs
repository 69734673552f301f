//! Secondary filtering and ordering parsed from query parameters.
//!
//! Parameters take the form `field[__lookup]=value`, e.g.
//! `name__icontains=alp` or `total_distance__lt=20000`. Each resource type
//! declares which fields may be filtered through a static [`FieldSpec`] table;
//! parameters naming any other field are ignored. A filter only ever narrows a
//! listing: stores AND its conditions onto the visibility scope.

use std::str::FromStr;

use strum::{AsRefStr, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Query parameters that are never interpreted as filters.
pub const RESERVED_PARAMS: &[&str] = &["page_number", "page_size", "ordering"];

// ─── Field declarations ──────────────────────────────────────────────────────

/// The value domain of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  Integer,
  Float,
  Boolean,
  Uuid,
  /// An integer code restricted to the listed values.
  Choice(&'static [i64]),
}

impl FieldKind {
  fn allows(self, lookup: Lookup) -> bool {
    use Lookup::*;
    match self {
      Self::Text => matches!(lookup, Exact | Iexact | Icontains),
      Self::Integer | Self::Float => matches!(lookup, Exact | Gt | Gte | Lt | Lte),
      Self::Boolean | Self::Uuid | Self::Choice(_) => lookup == Exact,
    }
  }

  fn parse_value(self, field: &str, raw: &str) -> Result<FilterValue> {
    let invalid = || Error::Parse(format!("invalid value {raw:?} for field {field:?}"));
    match self {
      Self::Text => Ok(FilterValue::Text(raw.to_owned())),
      Self::Integer => raw.parse().map(FilterValue::Integer).map_err(|_| invalid()),
      Self::Float => raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(FilterValue::Float)
        .ok_or_else(invalid),
      Self::Boolean => match raw {
        "true" | "True" | "1" => Ok(FilterValue::Boolean(true)),
        "false" | "False" | "0" => Ok(FilterValue::Boolean(false)),
        _ => Err(invalid()),
      },
      Self::Uuid => Uuid::parse_str(raw).map(FilterValue::Uuid).map_err(|_| invalid()),
      Self::Choice(codes) => raw
        .parse::<i64>()
        .ok()
        .filter(|code| codes.contains(code))
        .map(FilterValue::Integer)
        .ok_or_else(|| {
          Error::Parse(format!("{raw:?} is not a valid choice for field {field:?}"))
        }),
    }
  }
}

/// A field a resource type exposes to filtering and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  pub name:     &'static str,
  pub kind:     FieldKind,
  pub sortable: bool,
}

impl FieldSpec {
  pub const fn new(name: &'static str, kind: FieldKind) -> Self {
    Self { name, kind, sortable: false }
  }

  pub const fn sortable(mut self) -> Self {
    self.sortable = true;
    self
  }
}

// ─── Conditions ──────────────────────────────────────────────────────────────

/// A comparison operator, named the way it appears after `__` in a parameter.
///
/// `Iexact` and `Icontains` fold ASCII letters only: `ä` does not match `Ä`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Lookup {
  Exact,
  Iexact,
  Icontains,
  Gt,
  Gte,
  Lt,
  Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
  Text(String),
  Integer(i64),
  Float(f64),
  Boolean(bool),
  Uuid(Uuid),
}

/// One `field lookup value` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
  pub field:  &'static str,
  pub lookup: Lookup,
  pub value:  FilterValue,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
  pub field:      &'static str,
  pub descending: bool,
}

/// A conjunction of conditions plus an optional ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
  pub conditions: Vec<Condition>,
  /// Empty means the store's default order.
  pub ordering:   Vec<OrderBy>,
}

impl Filter {
  /// Parse query parameters against the fields a resource type declares.
  ///
  /// Unknown fields and empty values are skipped. A known field with an
  /// unsupported lookup or an unparseable value is an [`Error::Parse`].
  pub fn parse<'a, I>(fields: &'static [FieldSpec], params: I) -> Result<Self>
  where
    I: IntoIterator<Item = (&'a str, &'a str)>,
  {
    let mut filter = Self::default();

    for (key, raw) in params {
      if key == "ordering" {
        filter.ordering = parse_ordering(fields, raw)?;
        continue;
      }
      if RESERVED_PARAMS.contains(&key) || raw.is_empty() {
        continue;
      }

      let (name, lookup) = match key.split_once("__") {
        Some((name, lookup)) => (name, Some(lookup)),
        None => (key, None),
      };
      let Some(spec) = fields.iter().find(|f| f.name == name) else {
        continue;
      };

      let lookup = match lookup {
        None => Lookup::Exact,
        Some(l) => Lookup::from_str(l)
          .map_err(|_| Error::Parse(format!("unknown lookup {l:?} on field {name:?}")))?,
      };
      if !spec.kind.allows(lookup) {
        return Err(Error::Parse(format!(
          "lookup {:?} is not supported on field {name:?}",
          lookup.as_ref()
        )));
      }

      filter.conditions.push(Condition {
        field: spec.name,
        lookup,
        value: spec.kind.parse_value(name, raw)?,
      });
    }

    Ok(filter)
  }

  pub fn is_empty(&self) -> bool { self.conditions.is_empty() && self.ordering.is_empty() }
}

fn parse_ordering(fields: &'static [FieldSpec], raw: &str) -> Result<Vec<OrderBy>> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|term| !term.is_empty())
    .map(|term| {
      let (name, descending) = match term.strip_prefix('-') {
        Some(name) => (name, true),
        None => (term, false),
      };
      fields
        .iter()
        .find(|f| f.name == name && f.sortable)
        .map(|f| OrderBy { field: f.name, descending })
        .ok_or_else(|| Error::Parse(format!("cannot order by {name:?}")))
    })
    .collect()
}
