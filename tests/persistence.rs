use std::collections::BTreeMap;

use livescope::compositor::{PersistenceMode, RenderStyle};
use livescope::controller::OscilloscopeController;
use livescope::data::triggers::{TriggerEdge, TriggerMode};
use livescope::layout::Region;
use livescope::persistence::{
    load_state_from_path, save_state_to_path, PluginConfigFile, ScopeStateSerde,
};
use livescope::plugin::{PluginBinding, PluginRegistry};
use livescope::{ScopeConfig, MAX_EXTENDED_CHANNELS};

#[test]
fn plugin_config_round_trips_through_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plugins.yaml");

    let mut params = BTreeMap::new();
    params.insert("window".to_string(), "64".to_string());
    let config = PluginConfigFile {
        extended_channels: 2,
        bindings: vec![PluginBinding {
            plugin: "abs".to_string(),
            inputs: vec![0],
            outputs: vec![8],
            params,
        }],
    };
    config.save(&path).unwrap();

    let loaded = PluginConfigFile::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn plugin_config_clamps_extended_channels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plugins.yaml");
    std::fs::write(&path, "extended_channels: 99\n").unwrap();

    let loaded = PluginConfigFile::load(&path).unwrap();
    assert_eq!(loaded.extended_channels, MAX_EXTENDED_CHANNELS);
    assert!(loaded.bindings.is_empty());
}

#[test]
fn missing_plugin_config_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(PluginConfigFile::load(dir.path().join("absent.yaml")).is_err());
}

#[test]
fn scope_state_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let registry = PluginRegistry::with_builtins();

    let mut scope = OscilloscopeController::new(&registry, ScopeConfig::default()).unwrap();
    scope.trigger_mut().config.mode = TriggerMode::Single;
    scope.trigger_mut().config.edge = TriggerEdge::Down;
    scope.trigger_mut().config.level = 0.25;
    scope.display_config_mut().style = RenderStyle::Point;
    scope.display_config_mut().persistence = PersistenceMode::Persistent { fade: true };
    scope.set_zoom(2.0);
    scope.set_frozen(true);
    scope.layout_mut().set_region(
        1,
        Region {
            x: 5.0,
            y: 5.0,
            width: 50.0,
            height: 40.0,
        },
    );
    save_state_to_path(&scope, &path).unwrap();

    let mut restored = OscilloscopeController::new(&registry, ScopeConfig::default()).unwrap();
    load_state_from_path(&mut restored, &path).unwrap();

    assert_eq!(restored.trigger().config.mode, TriggerMode::Single);
    assert_eq!(restored.trigger().config.edge, TriggerEdge::Down);
    assert_eq!(restored.trigger().config.level, 0.25);
    assert_eq!(restored.display_config().style, RenderStyle::Point);
    assert_eq!(
        restored.display_config().persistence,
        PersistenceMode::Persistent { fade: true }
    );
    assert_eq!(restored.zoom(), 2.0);
    assert!(restored.is_frozen());
    assert_eq!(
        restored.layout().region_of(1).unwrap(),
        Region {
            x: 5.0,
            y: 5.0,
            width: 50.0,
            height: 40.0,
        }
    );
}

#[test]
fn state_mirror_defaults_manual_regions_when_absent() {
    // Older snapshots may lack the manual_regions map entirely.
    let json = r#"{
        "trigger": { "mode": "Auto", "edge": "Up", "level": 0.0, "channel": 0 },
        "trigger_timeout_cycles": 4,
        "display": {
            "style": "Line",
            "persistence": "Off",
            "decay_factor": 0.92,
            "antialias": true,
            "alpha_blend": true,
            "line_width": 1.5,
            "point_radius": 2.0,
            "value_range": [-1.5, 1.5]
        },
        "zoom": 1.0,
        "frozen": false
    }"#;
    let state: ScopeStateSerde = serde_json::from_str(json).unwrap();
    assert!(state.manual_regions.is_empty());
    assert_eq!(state.trigger.mode, TriggerMode::Auto);
}
