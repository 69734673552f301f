//! Translation of a [`ListQuery`] into SQL.
//!
//! The visibility scope becomes the first `WHERE` term and every filter
//! condition is ANDed after it, so filtering can only narrow what the scope
//! admits. Column names come from [`Table`] constants and from the static
//! field tables in `alpenwegs-core`; only values are bound as parameters.

use alpenwegs_core::{
  filter::{Condition, FilterValue, Lookup},
  store::ListQuery,
  visibility::Scope,
};
use rusqlite::types::Value;

use crate::{encode::encode_uuid, Error, Result};

/// Static description of a listable table.
#[derive(Debug)]
pub struct Table {
  pub name:          &'static str,
  /// Select list, in the order the matching row type reads it.
  pub columns:       &'static str,
  pub id:            &'static str,
  /// Rows are principals; only these tables accept [`Scope::OnlyId`].
  pub self_model:    bool,
  pub creator:       Option<&'static str>,
  pub public:        Option<&'static str>,
  /// Appended after any requested ordering so pages are stable.
  pub default_order: &'static str,
}

pub static USERS: Table = Table {
  name:          "users",
  columns:       "user_id, username, email, first_name, last_name, date_joined",
  id:            "user_id",
  self_model:    true,
  creator:       None,
  public:        None,
  default_order: "date_joined ASC, user_id ASC",
};

pub static TRACKS: Table = Table {
  name:          "tracks",
  columns:       "track_id, name, snippet, category, difficulty, total_distance, \
                  elevation_gain, average_speed, maximum_speed, total_time, \
                  is_public, creator_id, created_at",
  id:            "track_id",
  self_model:    false,
  creator:       Some("creator_id"),
  public:        Some("is_public"),
  default_order: "created_at ASC, track_id ASC",
};

pub static GROUPS: Table = Table {
  name:          "user_groups",
  columns:       "group_id, name",
  id:            "group_id",
  self_model:    false,
  creator:       None,
  public:        None,
  default_order: "name ASC",
};

/// The pieces of a `SELECT` built for one listing.
#[derive(Debug)]
pub struct Select {
  pub where_clause: String,
  pub params:       Vec<Value>,
  pub order_by:     String,
}

impl Select {
  pub fn count_sql(&self, table: &Table) -> String {
    format!("SELECT COUNT(*) FROM {} WHERE {}", table.name, self.where_clause)
  }

  /// Row query; expects `LIMIT` and `OFFSET` bound after [`Select::params`].
  pub fn rows_sql(&self, table: &Table) -> String {
    format!(
      "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
      table.columns, table.name, self.where_clause, self.order_by
    )
  }
}

pub fn build(table: &Table, query: &ListQuery) -> Result<Select> {
  let mut terms  = Vec::with_capacity(query.filter.conditions.len() + 1);
  let mut params = Vec::new();

  terms.push(scope_term(table, &query.scope, &mut params)?);
  for condition in &query.filter.conditions {
    terms.push(condition_term(condition, &mut params));
  }

  let mut order: Vec<String> = query
    .filter
    .ordering
    .iter()
    .map(|o| format!("{} {}", o.field, if o.descending { "DESC" } else { "ASC" }))
    .collect();
  order.push(table.default_order.to_owned());

  Ok(Select {
    where_clause: terms.join(" AND "),
    params,
    order_by: order.join(", "),
  })
}

fn scope_term(table: &Table, scope: &Scope, params: &mut Vec<Value>) -> Result<String> {
  let unsupported = |kind| Error::UnsupportedScope { table: table.name, scope: kind };
  match *scope {
    Scope::Nothing => Ok("0".to_owned()),
    Scope::OnlyId(id) => {
      if !table.self_model {
        return Err(unsupported("only-id"));
      }
      params.push(Value::Text(encode_uuid(id)));
      Ok(format!("{} = ?", table.id))
    }
    Scope::Public => {
      let public = table.public.ok_or_else(|| unsupported("public"))?;
      Ok(format!("{public} = 1"))
    }
    Scope::PublicOrCreator(user) => {
      let public  = table.public.ok_or_else(|| unsupported("public-or-creator"))?;
      let creator = table.creator.ok_or_else(|| unsupported("public-or-creator"))?;
      params.push(Value::Text(encode_uuid(user)));
      Ok(format!("({public} = 1 OR {creator} = ?)"))
    }
  }
}

fn condition_term(condition: &Condition, params: &mut Vec<Value>) -> String {
  let column = condition.field;
  let value  = match &condition.value {
    FilterValue::Text(s) if condition.lookup == Lookup::Icontains => {
      Value::Text(format!("%{}%", escape_like(s)))
    }
    FilterValue::Text(s) => Value::Text(s.clone()),
    FilterValue::Integer(i) => Value::Integer(*i),
    FilterValue::Float(f) => Value::Real(*f),
    FilterValue::Boolean(b) => Value::Integer(i64::from(*b)),
    FilterValue::Uuid(id) => Value::Text(encode_uuid(*id)),
  };
  params.push(value);

  match condition.lookup {
    Lookup::Exact => format!("{column} = ?"),
    // NOCASE and LIKE both fold ASCII only.
    Lookup::Iexact => format!("{column} = ? COLLATE NOCASE"),
    Lookup::Icontains => format!("{column} LIKE ? ESCAPE '\\'"),
    Lookup::Gt => format!("{column} > ?"),
    Lookup::Gte => format!("{column} >= ?"),
    Lookup::Lt => format!("{column} < ?"),
    Lookup::Lte => format!("{column} <= ?"),
  }
}

fn escape_like(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}
