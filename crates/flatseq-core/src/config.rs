//! Pipeline configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hard memory cap (in bytes) for the allocator built from this config.
    /// `None` means unbounded (a scratch arena).
    pub mem_cap_bytes: Option<usize>,

    /// Inner-buffer capacity for joins when the inner count is not known up front.
    pub join_initial_capacity: usize,

    /// Initial number of group slots in a grouping table.
    pub group_table_initial_capacity: usize,

    /// Initial element capacity of each group's buffer.
    pub group_initial_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let caps = Capacities::default();
        Self {
            mem_cap_bytes: None,
            join_initial_capacity: caps.join_initial,
            group_table_initial_capacity: caps.group_table_initial,
            group_initial_capacity: caps.group_initial,
        }
    }
}

/// Buffer sizing hints carried by an allocator handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    pub join_initial: usize,
    pub group_table_initial: usize,
    pub group_initial: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            join_initial: 16,
            group_table_initial: 8,
            group_initial: 4,
        }
    }
}

impl PipelineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `FLATSEQ_MEM_CAP_BYTES`: memory cap in bytes
    /// - `FLATSEQ_JOIN_INITIAL_CAPACITY`: join inner capacity when the count is unknown
    /// - `FLATSEQ_GROUP_TABLE_INITIAL_CAPACITY`: initial group slots
    /// - `FLATSEQ_GROUP_INITIAL_CAPACITY`: initial per-group element capacity
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PipelineConfig::from_env`] but reads from an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = parse_var(&lookup, "FLATSEQ_MEM_CAP_BYTES") {
            cfg.mem_cap_bytes = Some(v);
        }

        if let Some(v) = parse_var(&lookup, "FLATSEQ_JOIN_INITIAL_CAPACITY") {
            cfg.join_initial_capacity = v;
        }

        if let Some(v) = parse_var(&lookup, "FLATSEQ_GROUP_TABLE_INITIAL_CAPACITY") {
            cfg.group_table_initial_capacity = v;
        }

        if let Some(v) = parse_var(&lookup, "FLATSEQ_GROUP_INITIAL_CAPACITY") {
            cfg.group_initial_capacity = v;
        }

        cfg
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.join_initial_capacity == 0 {
            return Err(Error::Config("join_initial_capacity must be > 0".into()));
        }
        if self.group_table_initial_capacity == 0 {
            return Err(Error::Config(
                "group_table_initial_capacity must be > 0".into(),
            ));
        }
        if self.group_initial_capacity == 0 {
            return Err(Error::Config("group_initial_capacity must be > 0".into()));
        }
        Ok(())
    }

    /// Sizing hints handed to allocator handles built from this config.
    pub fn capacities(&self) -> Capacities {
        Capacities {
            join_initial: self.join_initial_capacity,
            group_table_initial: self.group_table_initial_capacity,
            group_initial: self.group_initial_capacity,
        }
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    lookup(key).and_then(|s| s.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_overrides_defaults() {
        let cfg = PipelineConfig::from_lookup(|key| match key {
            "FLATSEQ_MEM_CAP_BYTES" => Some("4096".into()),
            "FLATSEQ_JOIN_INITIAL_CAPACITY" => Some("not-a-number".into()),
            "FLATSEQ_GROUP_INITIAL_CAPACITY" => Some(" 2 ".into()),
            _ => None,
        });

        assert_eq!(cfg.mem_cap_bytes, Some(4096));
        assert_eq!(cfg.join_initial_capacity, 16);
        assert_eq!(cfg.group_initial_capacity, 2);
        assert_eq!(cfg.group_table_initial_capacity, 8);
    }

    #[test]
    fn test_json_partial_document() {
        let cfg = PipelineConfig::from_json_str(r#"{"mem_cap_bytes": 1024}"#).unwrap();
        assert_eq!(cfg.mem_cap_bytes, Some(1024));
        assert_eq!(cfg.capacities(), Capacities::default());
    }

    #[test]
    fn test_json_rejects_zero_capacity() {
        let err = PipelineConfig::from_json_str(r#"{"group_initial_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_json_rejects_garbage() {
        let err = PipelineConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
