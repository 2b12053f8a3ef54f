use std::collections::HashSet;

use crate::plugin_system::dependency::PluginDependency;
use crate::plugin_system::manifest::{ManifestBuilder, PluginManifest};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::resolver;
use crate::plugin_system::state::PluginState;
use crate::plugin_system::unit::{PluginKind, PluginUnit, UnitId};

fn add(registry: &mut PluginRegistry, manifest: PluginManifest) -> UnitId {
    registry.register_manifest(manifest, PluginKind::Static)
}

fn queue_names(registry: &PluginRegistry) -> Vec<String> {
    registry
        .load_queue()
        .iter()
        .map(|id| registry.get(*id).unwrap().name().to_string())
        .collect()
}

fn position(order: &[String], name: &str) -> usize {
    order.iter().position(|n| n == name).unwrap()
}

#[test]
fn test_providers_come_first() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("C", "1.0").requires("B", "1.0").build());
    add(&mut registry, ManifestBuilder::new("B", "1.0").requires("A", "1.0").build());
    add(&mut registry, ManifestBuilder::new("A", "1.0").build());
    add(&mut registry, ManifestBuilder::new("D", "1.0").requires("A", "1.0").requires("C", "1.0").build());

    registry.resolve();
    let order = queue_names(&registry);
    assert_eq!(order.len(), 4);
    assert!(position(&order, "A") < position(&order, "B"));
    assert!(position(&order, "B") < position(&order, "C"));
    assert!(position(&order, "C") < position(&order, "D"));
    assert!(!registry.has_errors());
    assert_eq!(registry.count_in_state(PluginState::Resolved), 4);
}

#[test]
fn test_missing_dependency() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Editor", "1.0").requires("Ghost", "2.0").build());
    registry.resolve();

    let editor = registry.get_plugin("Editor").unwrap();
    assert!(editor.has_error());
    assert_eq!(editor.error_string(), "Could not resolve dependency 'Ghost(2.0)'");
    assert_eq!(editor.state(), PluginState::Read);
}

#[test]
fn test_version_window() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Core", "2.5").compat_version("2.0").build());
    add(&mut registry, ManifestBuilder::new("InWindow", "1").requires("Core", "2.1").build());
    add(&mut registry, ManifestBuilder::new("AtNewest", "1").requires("Core", "2.5").build());
    add(&mut registry, ManifestBuilder::new("TooOld", "1").requires("Core", "1.9").build());
    add(&mut registry, ManifestBuilder::new("TooNew", "1").requires("Core", "3.0").build());
    registry.resolve();

    assert!(!registry.get_plugin("InWindow").unwrap().has_error());
    assert!(!registry.get_plugin("AtNewest").unwrap().has_error());

    let too_old = registry.get_plugin("TooOld").unwrap();
    assert!(too_old.has_error());
    assert!(too_old.error_string().contains("Core(1.9)"));
    assert!(too_old.error_string().contains("found version '2.5'"));

    let too_new = registry.get_plugin("TooNew").unwrap();
    assert!(too_new.has_error());
    assert!(too_new.error_string().contains("Core(3.0)"));
}

#[test]
fn test_provides_is_case_insensitive() {
    let core = PluginUnit::from_manifest(PluginManifest::new("Core", "1.0"), PluginKind::Static);
    assert!(core.provides(&PluginDependency::required("core", "1.0")));
    assert!(!core.provides(&PluginDependency::required("CORE", "0.5")));
    assert!(!core.provides(&PluginDependency::required("Core", "bogus")));
}

#[test]
fn test_invalid_versions_never_provide() {
    let mut manifest = PluginManifest::new("Core", "1.0");
    manifest.version = "latest".to_string();
    let core = PluginUnit::from_manifest(manifest, PluginKind::Static);
    assert!(!core.provides(&PluginDependency::required("Core", "1.0")));
}

#[test]
fn test_first_match_wins() {
    let mut registry = PluginRegistry::new();
    let first = add(&mut registry, ManifestBuilder::new("Core", "1.5").compat_version("1.0").build());
    let _second = add(&mut registry, ManifestBuilder::new("Core", "2.0").compat_version("1.0").build());
    add(&mut registry, ManifestBuilder::new("Editor", "1.0").requires("Core", "1.0").build());
    registry.resolve();

    let editor = registry.get_plugin("Editor").unwrap();
    assert_eq!(
        editor.dependency_specs().get(&PluginDependency::required("Core", "1.0")),
        Some(&first)
    );
}

#[test]
fn test_two_unit_cycle() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("A", "1").requires("B", "1").build());
    add(&mut registry, ManifestBuilder::new("B", "1").requires("A", "1").build());
    add(&mut registry, ManifestBuilder::new("C", "1").requires("A", "1").build());
    registry.resolve();

    let a = registry.get_plugin("A").unwrap();
    let b = registry.get_plugin("B").unwrap();
    let c = registry.get_plugin("C").unwrap();
    assert_eq!(a.error_string(), "Circular dependency detected:\nA(1) depends on\nB(1) depends on\nA(1)");
    assert!(b.has_error());
    assert!(c.has_error());
    assert_eq!(b.blocked_by(), Some("A"));
    assert_eq!(c.blocked_by(), Some("A"));
    assert_eq!(registry.load_queue().len(), 3);
    assert_eq!(registry.count_in_state(PluginState::Resolved), 0);
}

#[test]
fn test_long_cycle_terminates() {
    let mut registry = PluginRegistry::new();
    let names: Vec<String> = (0..50).map(|i| format!("P{}", i)).collect();
    for (i, name) in names.iter().enumerate() {
        let next = &names[(i + 1) % names.len()];
        add(&mut registry, ManifestBuilder::new(name, "1").requires(next, "1").build());
    }
    registry.resolve();
    assert!(registry.units().iter().all(|u| u.has_error()));
    assert_eq!(registry.load_queue().len(), 50);
}

#[test]
fn test_self_dependency() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Narcissus", "1").requires("Narcissus", "1").build());
    registry.resolve();

    let unit = registry.get_plugin("Narcissus").unwrap();
    assert_eq!(
        unit.error_string(),
        "Circular dependency detected:\nNarcissus(1) depends on\nNarcissus(1)"
    );
}

fn optional_loop_outcome(b_first: bool) -> Vec<(String, bool, PluginState)> {
    let mut registry = PluginRegistry::new();
    let a = ManifestBuilder::new("A", "1").requires("B", "1").build();
    let b = ManifestBuilder::new("B", "1").optional("A", "1").build();
    if b_first {
        add(&mut registry, b);
        add(&mut registry, a);
    } else {
        add(&mut registry, a);
        add(&mut registry, b);
    }
    registry.resolve();

    let mut outcome: Vec<(String, bool, PluginState)> = registry
        .units()
        .iter()
        .map(|u| (u.name().to_string(), u.has_error(), u.state()))
        .collect();
    outcome.sort_by(|x, y| x.0.cmp(&y.0));
    outcome
}

#[test]
fn test_optional_edge_breaks_loop_in_any_order() {
    let expected = vec![
        ("A".to_string(), false, PluginState::Resolved),
        ("B".to_string(), false, PluginState::Resolved),
    ];
    assert_eq!(optional_loop_outcome(false), expected);
    assert_eq!(optional_loop_outcome(true), expected);
}

#[test]
fn test_optional_loop_keeps_required_order() {
    for b_first in [false, true] {
        let mut registry = PluginRegistry::new();
        let a = ManifestBuilder::new("A", "1").requires("B", "1").build();
        let b = ManifestBuilder::new("B", "1").optional("A", "1").build();
        if b_first {
            add(&mut registry, b);
            add(&mut registry, a);
        } else {
            add(&mut registry, a);
            add(&mut registry, b);
        }
        registry.resolve();

        let order = queue_names(&registry);
        assert_eq!(order.len(), 2);
        assert!(position(&order, "B") < position(&order, "A"), "order {:?}", order);
    }
}

#[test]
fn test_optional_self_dependency_is_ignored() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Mirror", "1").optional("Mirror", "1").build());
    registry.resolve();

    let unit = registry.get_plugin("Mirror").unwrap();
    assert!(!unit.has_error());
    assert_eq!(unit.state(), PluginState::Resolved);
}

#[test]
fn test_blocked_dependents_report_root_cause() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Base", "1.0").requires("Ghost", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Middle", "1.0").requires("Base", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Top", "1.0").requires("Middle", "1.0").build());
    registry.resolve();

    let middle = registry.get_plugin("Middle").unwrap();
    assert_eq!(
        middle.error_string(),
        "Cannot load plugin because dependency failed to load: Base(1.0)\nReason: Could not resolve dependency 'Ghost(1.0)'"
    );
    assert_eq!(middle.blocked_by(), Some("Base"));
    assert_eq!(registry.get_plugin("Top").unwrap().blocked_by(), Some("Base"));
}

#[test]
fn test_optional_failures_do_not_block() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Help", "1.0").requires("Ghost", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Editor", "1.0").optional("Help", "1.0").optional("Absent", "1.0").build());
    registry.resolve();

    let editor = registry.get_plugin("Editor").unwrap();
    assert!(!editor.has_error());
    assert_eq!(editor.state(), PluginState::Resolved);
}

#[test]
fn test_test_edges_do_not_order_or_block() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Editor", "1.0").test_dependency("Mock", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Mock", "1.0").requires("Editor", "1.0").build());
    registry.resolve();
    assert!(!registry.has_errors());
}

#[test]
fn test_enable_dependencies_indirectly() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Core", "1.0").disabled_by_default(true).build());
    add(&mut registry, ManifestBuilder::new("Lib", "1.0").experimental(true).requires("Core", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Editor", "1.0").requires("Lib", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Unused", "1.0").disabled_by_default(true).build());

    let enabled = registry.resolve();
    let names: Vec<&str> = enabled.iter().map(|id| registry.get(*id).unwrap().name()).collect();
    assert_eq!(names, vec!["Lib", "Core"]);
    assert!(registry.get_plugin("Core").unwrap().is_enabled_indirectly());
    assert!(registry.is_enabled("Core"));
    assert!(!registry.is_enabled("Unused"));

    registry.disable_plugin("Editor").unwrap();
    assert!(registry.enable_dependencies_indirectly().is_empty());
    assert!(!registry.is_enabled("Core"));
}

#[test]
fn test_test_dependencies_enabled_for_plugins_under_test() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Editor", "1.0").test_dependency("Mock", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Mock", "1.0").disabled_by_default(true).build());

    registry.resolve();
    assert!(!registry.is_enabled("Mock"));

    registry.set_test_plugins(["Editor"]);
    registry.enable_dependencies_indirectly();
    assert!(registry.is_enabled("Mock"));
}

#[test]
fn test_host_platform_restriction() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("WinOnly", "1.0").platform("^windows").build());
    add(&mut registry, ManifestBuilder::new("Anywhere", "1.0").requires("WinOnly", "1.0").build());
    registry.set_host_platform("linux (x86_64)");

    let enabled = registry.resolve();
    assert!(enabled.is_empty());
    let win_only = registry.get_plugin("WinOnly").unwrap();
    assert!(!win_only.is_available_for_host_platform());
    assert!(!win_only.is_effectively_enabled());

    registry.get_plugin_mut("WinOnly").unwrap().set_force_enabled(true);
    assert!(!registry.is_enabled("WinOnly"));
}

#[test]
fn test_transitive_queries() {
    let mut registry = PluginRegistry::new();
    let a = add(&mut registry, ManifestBuilder::new("A", "1").build());
    let b = add(&mut registry, ManifestBuilder::new("B", "1").requires("A", "1").build());
    let c = add(&mut registry, ManifestBuilder::new("C", "1").requires("B", "1").optional("D", "1").build());
    let _d = add(&mut registry, ManifestBuilder::new("D", "1").build());
    registry.resolve();

    assert_eq!(resolver::required_by(registry.units(), c), vec![a, b]);
    assert_eq!(resolver::requiring(registry.units(), a), vec![b, c]);

    let names: Vec<&str> = registry.plugins_requiring("B").unwrap().iter().map(|u| u.name()).collect();
    assert_eq!(names, vec!["C"]);
    assert!(registry.plugins_required_by("D").unwrap().is_empty());
    assert!(registry.plugins_required_by("Nope").is_err());
}

#[test]
fn test_enable_from_explicit_set() {
    let mut registry = PluginRegistry::new();
    add(&mut registry, ManifestBuilder::new("Core", "1.0").build());
    add(&mut registry, ManifestBuilder::new("Editor", "1.0").test_dependency("Core", "1.0").build());
    registry.resolve();

    let mut units = registry.units().to_vec();
    units[0].set_enabled_by_settings(false);
    let under_test: HashSet<String> = ["Editor".to_string()].into_iter().collect();
    let enabled = resolver::enable_dependencies_indirectly(&mut units, &under_test);
    assert_eq!(enabled.len(), 1);
    assert!(units[0].is_effectively_enabled());
}
