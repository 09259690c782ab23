//! Autosplitter settings
//!
//! The settings surface lives in the host; this is the part of its document
//! the engine consumes: the selected event identifiers, the pass-through
//! "pause game time" preference, and optional address overrides.
//! Settings can be read from TOML or JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::events::{legacy, CatalogEvent};
use crate::game::BinaryVariant;
use crate::memory::AddressPath;
use crate::{AutosplitterError, Result};

/// Settings for one run configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterSettings {
    /// Selected event identifiers (current or legacy)
    #[serde(default)]
    pub used_events: Vec<String>,
    /// Whether the host should pause game time during loads. Not interpreted
    /// by the engine.
    #[serde(default)]
    pub pause_game_time: bool,
    /// Address overrides per game version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_overrides: Option<LayoutOverrides>,
}

/// Address overrides, keyed by game version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOverrides {
    #[serde(default)]
    pub v11: Option<VariantLayout>,
    #[serde(default)]
    pub v12: Option<VariantLayout>,
}

impl LayoutOverrides {
    pub fn for_variant(&self, variant: BinaryVariant) -> Option<&VariantLayout> {
        match variant {
            BinaryVariant::V11 => self.v11.as_ref(),
            BinaryVariant::V12 => self.v12.as_ref(),
        }
    }
}

/// Overrides for one version; unset entries keep the built-in address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantLayout {
    #[serde(default)]
    pub game_state: Option<AddressPath>,
    #[serde(default)]
    pub current_map: Option<AddressPath>,
    #[serde(default)]
    pub boss_health: Option<AddressPath>,
    #[serde(default)]
    pub in_menu: Option<AddressPath>,
    #[serde(default)]
    pub skipping_cinematic: Option<AddressPath>,
}

impl SplitterSettings {
    pub fn new(used_events: Vec<String>) -> Self {
        Self {
            used_events,
            ..Default::default()
        }
    }

    /// Parse settings from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| AutosplitterError::Config(e.to_string()))
    }

    /// Parse settings from a JSON document
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| AutosplitterError::Config(e.to_string()))
    }

    /// Load settings from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;

        let settings = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source)?,
            Some("toml") => Self::from_toml_str(&source)?,
            other => {
                return Err(AutosplitterError::Config(format!(
                    "unsupported settings format: {:?}",
                    other
                )))
            }
        };

        log::info!(
            "Loaded settings from {} ({} events)",
            path.display(),
            settings.used_events.len()
        );
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AutosplitterError::Config(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AutosplitterError::Config(e.to_string()))
    }

    /// Resolve the selected identifiers to catalog entries in gameplay order.
    ///
    /// Legacy identifiers are translated; unknown identifiers become the
    /// empty event, and empty events are not part of the selection.
    pub fn resolve_events(&self) -> Vec<&'static CatalogEvent> {
        let mut events: Vec<&'static CatalogEvent> = self
            .used_events
            .iter()
            .map(|id| legacy::resolve_identifier(id))
            .filter(|event| !event.is_empty())
            .collect();

        events.sort_by_key(|event| event.rank());
        events.dedup_by_key(|event| event.rank());
        events
    }

    /// Store the given events as the selection, using current identifiers
    pub fn set_events(&mut self, events: &[&CatalogEvent]) {
        self.used_events = events.iter().map(|e| e.id().to_string()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_settings_default() {
        let settings = SplitterSettings::default();
        assert!(settings.used_events.is_empty());
        assert!(!settings.pause_game_time);
        assert!(settings.layout_overrides.is_none());
    }

    #[test]
    fn test_settings_toml() {
        let settings = SplitterSettings::from_toml_str(
            r#"
            used_events = ["started_game", "loaded_map:borg1", "finished_map:borg1"]
            pause_game_time = true
        "#,
        )
        .unwrap();

        assert_eq!(settings.used_events.len(), 3);
        assert!(settings.pause_game_time);
    }

    #[test]
    fn test_settings_toml_with_overrides() {
        let settings = SplitterSettings::from_toml_str(
            r#"
            used_events = []

            [layout_overrides.v12]
            skipping_cinematic = 0x2A0000
            boss_health = [0x641C28, 0x7A08]
        "#,
        )
        .unwrap();

        let overrides = settings.layout_overrides.unwrap();
        assert!(overrides.for_variant(BinaryVariant::V11).is_none());

        let v12 = overrides.for_variant(BinaryVariant::V12).unwrap();
        assert_eq!(v12.skipping_cinematic, Some(AddressPath::Offset(0x2A0000)));
        assert_eq!(v12.boss_health, Some(AddressPath::Chain(vec![0x641C28, 0x7A08])));
        assert!(v12.game_state.is_none());
    }

    #[test]
    fn test_settings_json_round_trip() {
        let mut settings = SplitterSettings::new(vec!["vorsoth_dead".to_string()]);
        settings.pause_game_time = true;

        let json = settings.to_json_string().unwrap();
        let parsed = SplitterSettings::from_json_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_settings_invalid_document() {
        let err = SplitterSettings::from_toml_str("used_events = 5").unwrap_err();
        assert!(matches!(err, AutosplitterError::Config(_)));
    }

    #[test]
    fn test_resolve_events_sorts_and_translates() {
        let settings = SplitterSettings::new(vec![
            "finished_map_borg1".to_string(),
            "new_game_started".to_string(),
            "something_unknown".to_string(),
            "loaded_map:borg1".to_string(),
            "loaded_map_borg1".to_string(),
        ]);

        let kinds: Vec<EventKind> = settings.resolve_events().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::StartedGame,
                EventKind::LoadedMap("borg1"),
                EventKind::FinishedMap("borg1"),
            ]
        );
    }

    #[test]
    fn test_set_events_writes_current_ids() {
        let mut settings = SplitterSettings::new(vec!["finished_map_voy1".to_string()]);
        let events = settings.resolve_events();
        settings.set_events(&events);

        assert_eq!(settings.used_events, vec!["finished_map:voy1".to_string()]);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "stvoyef-settings-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "used_events = [\"vorsoth_dead\"]\n").unwrap();

        let settings = SplitterSettings::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(settings.used_events, vec!["vorsoth_dead".to_string()]);
    }

    #[test]
    fn test_load_unknown_extension() {
        let path = std::env::temp_dir().join(format!(
            "stvoyef-settings-{}.xml",
            std::process::id()
        ));
        fs::write(&path, "<settings/>").unwrap();

        let result = SplitterSettings::load(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(AutosplitterError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SplitterSettings::load("/nonexistent/stvoyef-settings.toml");
        assert!(matches!(result, Err(AutosplitterError::Io(_))));
    }
}
