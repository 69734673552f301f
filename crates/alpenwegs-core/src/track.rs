//! Tracks: recorded outdoor routes.
//!
//! Tracks carry `is_public` and an optional `creator_id`, so they are listed
//! under [`Visibility::OwnedOrPublic`].

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  filter::{FieldKind, FieldSpec},
  resource::{Resource, ResourceKind},
  store::{ListQuery, Listing, Store},
  visibility::Visibility,
};

// ─── Category ────────────────────────────────────────────────────────────────

/// The activity a track was recorded for. Stored and filtered by its numeric
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCategory {
  Running,
  Hike,
  Climbing,
}

/// Every valid category code, for filter validation.
pub const CATEGORY_CODES: &[i64] = &[110, 120, 130];

impl TrackCategory {
  pub fn code(self) -> i64 {
    match self {
      Self::Running => 110,
      Self::Hike => 120,
      Self::Climbing => 130,
    }
  }

  pub fn from_code(code: i64) -> Option<Self> {
    match code {
      110 => Some(Self::Running),
      120 => Some(Self::Hike),
      130 => Some(Self::Climbing),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Running => "Running",
      Self::Hike => "Hike",
      Self::Climbing => "Climbing",
    }
  }
}

// ─── Track ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
  pub track_id:       Uuid,
  pub name:           String,
  pub snippet:        Option<String>,
  pub category:       TrackCategory,
  /// Category-specific grade, e.g. "T3" for hikes or "6a" for climbs.
  pub difficulty:     Option<String>,
  /// Metres.
  pub total_distance: f64,
  /// Metres.
  pub elevation_gain: f64,
  /// km/h.
  pub average_speed:  Option<f64>,
  /// km/h.
  pub maximum_speed:  Option<f64>,
  /// Seconds.
  pub total_time:     Option<i64>,
  pub is_public:      bool,
  pub creator_id:     Option<Uuid>,
  pub created_at:     DateTime<Utc>,
}

/// Input to [`Store::create_track`]. `track_id` and `created_at` are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewTrack {
  pub name:           String,
  pub snippet:        Option<String>,
  pub category:       TrackCategory,
  pub difficulty:     Option<String>,
  pub total_distance: f64,
  pub elevation_gain: f64,
  pub average_speed:  Option<f64>,
  pub maximum_speed:  Option<f64>,
  pub total_time:     Option<i64>,
  pub is_public:      bool,
  pub creator_id:     Option<Uuid>,
}

impl NewTrack {
  /// A private, creator-less track with zeroed measurements.
  pub fn new(name: impl Into<String>, category: TrackCategory) -> Self {
    Self {
      name: name.into(),
      snippet: None,
      category,
      difficulty: None,
      total_distance: 0.0,
      elevation_gain: 0.0,
      average_speed: None,
      maximum_speed: None,
      total_time: None,
      is_public: false,
      creator_id: None,
    }
  }

  pub fn public(mut self, is_public: bool) -> Self {
    self.is_public = is_public;
    self
  }

  pub fn created_by(mut self, creator_id: Uuid) -> Self {
    self.creator_id = Some(creator_id);
    self
  }

  pub fn distance(mut self, total_distance: f64) -> Self {
    self.total_distance = total_distance;
    self
  }
}

// ─── Relation representation ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRelation {
  pub value: i64,
  pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifficultyRelation {
  pub label: String,
}

/// Summary fields rendered in list responses, in this order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRelation {
  pub track_id:                     Uuid,
  pub name:                         String,
  pub snippet:                      Option<String>,
  pub category:                     CategoryRelation,
  pub category_specific_difficulty: Option<DifficultyRelation>,
  pub total_distance:               f64,
  pub elevation_gain:               f64,
  pub average_speed:                Option<f64>,
  pub maximum_speed:                Option<f64>,
  pub total_time:                   Option<i64>,
  pub is_public:                    bool,
  pub creator_id:                   Option<Uuid>,
}

impl Resource for Track {
  type Relation = TrackRelation;

  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::new("name", FieldKind::Text).sortable(),
    FieldSpec::new("category", FieldKind::Choice(CATEGORY_CODES)),
    FieldSpec::new("difficulty", FieldKind::Text),
    FieldSpec::new("total_distance", FieldKind::Float).sortable(),
    FieldSpec::new("elevation_gain", FieldKind::Float).sortable(),
    FieldSpec::new("average_speed", FieldKind::Float).sortable(),
    FieldSpec::new("maximum_speed", FieldKind::Float).sortable(),
    FieldSpec::new("total_time", FieldKind::Integer).sortable(),
    FieldSpec::new("is_public", FieldKind::Boolean),
    FieldSpec::new("creator_id", FieldKind::Uuid),
  ];
  const KIND: ResourceKind = ResourceKind::Track;
  const VISIBILITY: Visibility = Visibility::OwnedOrPublic;

  fn relation(&self) -> TrackRelation {
    TrackRelation {
      track_id:                     self.track_id,
      name:                         self.name.clone(),
      snippet:                      self.snippet.clone(),
      category:                     CategoryRelation {
        value: self.category.code(),
        label: self.category.label(),
      },
      category_specific_difficulty: self
        .difficulty
        .clone()
        .map(|label| DifficultyRelation { label }),
      total_distance:               self.total_distance,
      elevation_gain:               self.elevation_gain,
      average_speed:                self.average_speed,
      maximum_speed:                self.maximum_speed,
      total_time:                   self.total_time,
      is_public:                    self.is_public,
      creator_id:                   self.creator_id,
    }
  }

  fn fetch<'a, S: Store>(
    store: &'a S,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Listing<Self>, S::Error>> + Send + 'a {
    store.list_tracks(query)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_codes_roundtrip() {
    for &code in CATEGORY_CODES {
      let category = TrackCategory::from_code(code).unwrap();
      assert_eq!(category.code(), code);
    }
    assert_eq!(TrackCategory::from_code(100), None);
  }

  #[test]
  fn relation_uses_category_value_and_label() {
    let track = Track {
      track_id:       Uuid::new_v4(),
      name:           "Haute Route".into(),
      snippet:        None,
      category:       TrackCategory::Hike,
      difficulty:     Some("T4".into()),
      total_distance: 180_000.0,
      elevation_gain: 12_000.0,
      average_speed:  None,
      maximum_speed:  None,
      total_time:     None,
      is_public:      true,
      creator_id:     None,
      created_at:     Utc::now(),
    };
    let json = serde_json::to_value(track.relation()).unwrap();
    assert_eq!(json["category"], serde_json::json!({ "value": 120, "label": "Hike" }));
    assert_eq!(json["category_specific_difficulty"]["label"], "T4");

    let text = serde_json::to_string(&track.relation()).unwrap();
    let at   = |key: &str| text.find(&format!("\"{key}\":")).unwrap();
    assert!(at("track_id") < at("name"));
    assert!(at("name") < at("category"));
    assert!(at("is_public") < at("creator_id"));
  }
}
