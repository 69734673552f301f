//! Runtime server configuration, deserialised from `config.toml` layered with
//! `ALPENWEGS_*` environment variables.

use std::path::PathBuf;

use alpenwegs_api::ApiConfig;
use alpenwegs_core::page::Paginator;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaginationConfig {
  pub enabled:           bool,
  pub default_page_size: u64,
  pub max_page_size:     u64,
}

impl Default for PaginationConfig {
  fn default() -> Self {
    let paginator = Paginator::default();
    Self {
      enabled:           true,
      default_page_size: paginator.default_page_size,
      max_page_size:     paginator.max_page_size,
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("alpenwegs.sqlite3") }

impl ServerConfig {
  /// Router settings derived from this configuration.
  pub fn api_config(&self) -> ApiConfig {
    let pagination = self.pagination.enabled.then(|| Paginator {
      default_page_size: self.pagination.default_page_size.max(1),
      max_page_size:     self.pagination.max_page_size.max(1),
    });
    ApiConfig { pagination, ..ApiConfig::default() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn load(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = load("");
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.api_config().pagination, Some(Paginator::default()));
  }

  #[test]
  fn pagination_can_be_disabled() {
    let cfg = load("[pagination]\nenabled = false\n");
    assert_eq!(cfg.api_config().pagination, None);
  }

  #[test]
  fn page_sizes_are_read() {
    let cfg = load("port = 9000\n[pagination]\ndefault_page_size = 5\nmax_page_size = 50\n");
    assert_eq!(cfg.port, 9000);
    assert_eq!(
      cfg.api_config().pagination,
      Some(Paginator { default_page_size: 5, max_page_size: 50 })
    );
  }
}
