//! Dependency graph walks over a registry's unit arena.
//!
//! Resolution happens in three passes:
//!
//! 1. every unit maps its declared dependencies to concrete providers
//!    ([`PluginUnit::resolve_dependencies`]);
//! 2. a depth-first walk orders the units providers-first, detecting cycles
//!    with a "currently resolving" stack and blocking dependents of failed
//!    providers ([`build_load_queue`]);
//! 3. surviving units are promoted to `Resolved` in queue order, so a unit is
//!    only promoted once all of its providers have been.
use std::collections::{HashSet, VecDeque};

use crate::plugin_system::dependency::{DependencyError, DependencyKind};
use crate::plugin_system::state::PluginState;
use crate::plugin_system::unit::{PluginUnit, ProviderInfo, UnitId};

/// Runs all three resolution passes and returns the load queue.
pub fn resolve_all(units: &mut [PluginUnit]) -> Vec<UnitId> {
    let providers: Vec<ProviderInfo> = units
        .iter()
        .enumerate()
        .filter(|(_, unit)| unit.state() != PluginState::Invalid)
        .map(|(index, unit)| unit.provider_info(UnitId(index)))
        .collect();

    for unit in units.iter_mut() {
        unit.resolve_dependencies(&providers);
    }

    let queue = build_load_queue(units);

    for id in &queue {
        let unit = &mut units[id.0];
        if !unit.has_error() && unit.state() == PluginState::Read {
            if let Err(e) = unit.advance_to(PluginState::Resolved) {
                log::error!("{}", e);
            }
        }
    }
    queue
}

/// Orders all units so that no unit precedes a provider it depends on.
///
/// Every unit appears exactly once. Units that are in error (their own, a
/// cycle, or a failed Required provider) are still listed so callers can
/// report them, but they carry an error and are skipped by the loader.
///
/// A loop made only of Required edges fails. A loop with an Optional edge in
/// it is cut at that edge, so the units load in their Required order
/// whichever of them was registered first.
pub fn build_load_queue(units: &mut [PluginUnit]) -> Vec<UnitId> {
    let mut walk = LoadQueueWalk {
        queue: Vec::with_capacity(units.len()),
        outcome: vec![None; units.len()],
    };
    for index in 0..units.len() {
        let mut resolving = Vec::new();
        walk.visit(units, UnitId(index), DependencyKind::Required, &mut resolving);
    }
    walk.queue
}

struct LoadQueueWalk {
    queue: Vec<UnitId>,
    outcome: Vec<Option<bool>>,
}

/// Result of visiting one unit during the load queue walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Ok,
    Failed,
    /// The walk ran into a dependency loop containing an Optional edge. The
    /// edge that entered stack position `.0` is dropped; every unit above
    /// that position is left unfinished and gets walked again later.
    Unwind(usize),
}

impl LoadQueueWalk {
    /// `via` is the kind of edge the walk followed to reach `id`. The
    /// `resolving` stack records each unit with the edge that entered it.
    fn visit(
        &mut self,
        units: &mut [PluginUnit],
        id: UnitId,
        via: DependencyKind,
        resolving: &mut Vec<(UnitId, DependencyKind)>,
    ) -> Visit {
        if let Some(done) = self.outcome[id.0] {
            return if done { Visit::Ok } else { Visit::Failed };
        }

        // Loop: the unit is already somewhere on the walk stack.
        if let Some(start) = resolving.iter().position(|(r, _)| *r == id) {
            let closing = resolving.len();
            let optional_edge = (start + 1..=closing).rev().find(|&position| {
                let kind = if position == closing { via } else { resolving[position].1 };
                kind == DependencyKind::Optional
            });
            if let Some(position) = optional_edge {
                log::debug!(
                    "Dependency loop through '{}' contains an optional edge; dropping that edge",
                    units[id.0].name()
                );
                return Visit::Unwind(position);
            }

            let mut participants: Vec<String> = resolving[start..]
                .iter()
                .map(|(r, _)| units[r.0].display_name())
                .collect();
            participants.push(units[id.0].display_name());
            let error = DependencyError::CyclicDependency(participants);
            log::warn!("{}", error);
            units[id.0].fail(error.to_string());
            return Visit::Failed;
        }

        resolving.push((id, via));
        let visit = self.visit_dependencies(units, id, resolving);
        resolving.pop();

        if let Visit::Unwind(_) = visit {
            return visit;
        }
        self.outcome[id.0] = Some(visit == Visit::Ok);
        self.queue.push(id);
        visit
    }

    fn visit_dependencies(
        &mut self,
        units: &mut [PluginUnit],
        id: UnitId,
        resolving: &mut Vec<(UnitId, DependencyKind)>,
    ) -> Visit {
        if units[id.0].has_error() || units[id.0].state() == PluginState::Invalid {
            return Visit::Failed;
        }

        let edges: Vec<(DependencyKind, UnitId)> = units[id.0]
            .dependencies()
            .iter()
            .filter(|dep| dep.kind != DependencyKind::Test)
            .filter_map(|dep| units[id.0].dependency_specs().get(dep).map(|p| (dep.kind, *p)))
            .collect();
        let child_position = resolving.len();

        for (kind, provider) in edges {
            match self.visit(units, provider, kind, resolving) {
                Visit::Ok => continue,
                Visit::Unwind(position) if position == child_position => continue,
                unwind @ Visit::Unwind(_) => return unwind,
                Visit::Failed => {}
            }
            if kind == DependencyKind::Required {
                if !units[id.0].has_error() {
                    let cause = units[provider.0].block_cause();
                    units[id.0].block(cause);
                }
                return Visit::Failed;
            }
            log::debug!(
                "Optional provider '{}' of '{}' failed; continuing without it",
                units[provider.0].name(),
                units[id.0].name()
            );
        }
        if units[id.0].has_error() { Visit::Failed } else { Visit::Ok }
    }
}

/// Switches on, transitively, every provider an enabled unit needs.
///
/// Resets the indirect flag on all units first, then works through a queue
/// seeded with every effectively enabled unit. Test edges are followed for
/// units named in `test_plugins`. Returns the units newly enabled, in the
/// order they were switched on.
pub fn enable_dependencies_indirectly(units: &mut [PluginUnit], test_plugins: &HashSet<String>) -> Vec<UnitId> {
    for unit in units.iter_mut() {
        unit.set_enabled_indirectly(false);
    }

    let mut queue: VecDeque<UnitId> = units
        .iter()
        .enumerate()
        .filter(|(_, unit)| unit.is_effectively_enabled())
        .map(|(index, _)| UnitId(index))
        .collect();
    let mut newly_enabled = Vec::new();

    while let Some(id) = queue.pop_front() {
        let dependent_name = units[id.0].name().to_string();
        let enable_tests = test_plugins.contains(&dependent_name);
        for provider in units[id.0].dependencies_to_enable(enable_tests) {
            let provider_unit = &mut units[provider.0];
            if provider_unit.is_effectively_enabled() {
                continue;
            }
            provider_unit.set_enabled_indirectly(true);
            if !provider_unit.is_effectively_enabled() {
                // Not available on this host; enabling it changes nothing.
                continue;
            }
            log::info!(
                "Enabling plugin '{}' because '{}' depends on it",
                provider_unit.name(),
                dependent_name
            );
            newly_enabled.push(provider);
            queue.push_back(provider);
        }
    }
    newly_enabled
}

/// Every unit `id` transitively depends on through Required edges.
pub fn required_by(units: &[PluginUnit], id: UnitId) -> Vec<UnitId> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    let mut stack = units[id.0].providers_of_kind(DependencyKind::Required);
    while let Some(next) = stack.pop() {
        if next == id || !seen.insert(next) {
            continue;
        }
        result.push(next);
        stack.extend(units[next.0].providers_of_kind(DependencyKind::Required));
    }
    result.sort();
    result
}

/// Every unit that transitively depends on `id` through Required edges.
pub fn requiring(units: &[PluginUnit], id: UnitId) -> Vec<UnitId> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    let mut frontier = vec![id];
    while let Some(target) = frontier.pop() {
        for (index, unit) in units.iter().enumerate() {
            let candidate = UnitId(index);
            if candidate == id || seen.contains(&candidate) {
                continue;
            }
            if unit.providers_of_kind(DependencyKind::Required).contains(&target) {
                seen.insert(candidate);
                result.push(candidate);
                frontier.push(candidate);
            }
        }
    }
    result.sort();
    result
}
