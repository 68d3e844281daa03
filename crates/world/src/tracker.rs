//! Periodic enter/exit detection for actors moving between regions.
//!
//! Every `check_interval` ticks each tracked actor's current region set is
//! compared with the set from the previous poll. Regions entered and left
//! between two polls produce no events.

use std::collections::HashMap;

use tracing::debug;
use voidworld_core::{ActorId, BlockPos, RegistryKey};

use crate::host::{MessageChannel, MessageSink};
use crate::location::GameLocation;
use crate::location_registry::LocationRegistry;

/// Default polling period in ticks (twice per second at 20 TPS).
pub const CHECK_INTERVAL: u32 = 10;

/// Callback invoked when an actor enters or leaves a region.
pub type LocationListener = Box<dyn FnMut(ActorId, &GameLocation)>;

/// Actor snapshot supplied to [`LocationTracker::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorPosition {
    /// Who.
    pub actor: ActorId,
    /// Dimension the actor is in.
    pub dimension: RegistryKey,
    /// Block position of the actor's feet.
    pub pos: BlockPos,
}

/// Transitions produced by one poll of one actor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollResult {
    /// Regions entered, in registration order.
    pub entered: Vec<RegistryKey>,
    /// Regions left, in the order they were entered.
    pub exited: Vec<RegistryKey>,
}

impl PollResult {
    /// Whether the poll changed nothing.
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Per-actor region membership plus the listener lists.
pub struct LocationTracker {
    check_interval: u32,
    tick_counter: u32,
    inside: HashMap<ActorId, Vec<RegistryKey>>,
    enter_listeners: Vec<LocationListener>,
    exit_listeners: Vec<LocationListener>,
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new(CHECK_INTERVAL)
    }
}

impl LocationTracker {
    /// Tracker polling every `check_interval` ticks (at least 1).
    pub fn new(check_interval: u32) -> Self {
        Self {
            check_interval: check_interval.max(1),
            tick_counter: 0,
            inside: HashMap::new(),
            enter_listeners: Vec::new(),
            exit_listeners: Vec::new(),
        }
    }

    /// Polling period in ticks.
    pub fn check_interval(&self) -> u32 {
        self.check_interval
    }

    /// Add an enter listener; listeners run in registration order.
    pub fn on_enter(&mut self, listener: impl FnMut(ActorId, &GameLocation) + 'static) {
        self.enter_listeners.push(Box::new(listener));
    }

    /// Add an exit listener; listeners run in registration order.
    pub fn on_exit(&mut self, listener: impl FnMut(ActorId, &GameLocation) + 'static) {
        self.exit_listeners.push(Box::new(listener));
    }

    /// Regions `actor` was inside at the last poll, in registration order.
    pub fn current_locations(&self, actor: ActorId) -> Option<&[RegistryKey]> {
        self.inside.get(&actor).map(Vec::as_slice)
    }

    /// Whether `actor` was inside `id` at the last poll.
    pub fn is_in_location(&self, actor: ActorId, id: &RegistryKey) -> bool {
        self.inside.get(&actor).is_some_and(|set| set.contains(id))
    }

    /// Actors with tracking state.
    pub fn tracked_actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.inside.keys().copied()
    }

    /// Forget `actor` without firing exit events.
    pub fn remove_actor(&mut self, actor: ActorId) {
        self.inside.remove(&actor);
    }

    /// Drop all tracking state. Listeners stay registered.
    pub fn clear(&mut self) {
        self.inside.clear();
        self.tick_counter = 0;
    }

    /// Advance one tick; on every interval boundary poll each actor.
    /// Returns `true` when a poll happened.
    pub fn tick<'a, I>(
        &mut self,
        registry: &LocationRegistry,
        actors: I,
        sink: &mut dyn MessageSink,
    ) -> bool
    where
        I: IntoIterator<Item = &'a ActorPosition>,
    {
        self.tick_counter += 1;
        if self.tick_counter < self.check_interval {
            return false;
        }
        self.tick_counter = 0;

        for actor in actors {
            self.poll(registry, actor, sink);
        }
        true
    }

    /// Diff one actor's membership against the registry right now.
    pub fn poll(
        &mut self,
        registry: &LocationRegistry,
        actor: &ActorPosition,
        sink: &mut dyn MessageSink,
    ) -> PollResult {
        // Chunk buckets hold IDs in registration order.
        let now_inside: Vec<RegistryKey> = registry
            .locations_at(&actor.dimension, actor.pos)
            .into_iter()
            .map(|loc| loc.id.clone())
            .collect();

        let previously = self.inside.entry(actor.actor).or_default();
        let entered: Vec<RegistryKey> = now_inside
            .iter()
            .filter(|id| !previously.contains(id))
            .cloned()
            .collect();
        let exited: Vec<RegistryKey> = previously
            .iter()
            .filter(|id| !now_inside.contains(id))
            .cloned()
            .collect();
        *previously = now_inside;

        let mut result = PollResult::default();

        for id in entered {
            let Some(location) = registry.get(&id) else {
                continue;
            };
            debug!(actor = %actor.actor, location = %id, "actor entered location");
            if location.notify_on_entry {
                sink.send(actor.actor, MessageChannel::ActionBar, &location.name_key);
            }
            for listener in &mut self.enter_listeners {
                listener(actor.actor, location);
            }
            result.entered.push(id);
        }

        for id in exited {
            // Regions unregistered since the last poll leave silently.
            let Some(location) = registry.get(&id) else {
                continue;
            };
            debug!(actor = %actor.actor, location = %id, "actor exited location");
            for listener in &mut self.exit_listeners {
                listener(actor.actor, location);
            }
            result.exited.push(id);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullSink;
    use crate::location::LocationType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn overworld() -> RegistryKey {
        RegistryKey::minecraft("overworld")
    }

    fn registry() -> LocationRegistry {
        let mut registry = LocationRegistry::new();
        registry.register(GameLocation::new(
            RegistryKey::voidworld("a"),
            overworld(),
            BlockPos::new(0, 0, 0),
            BlockPos::new(10, 10, 10),
            LocationType::District,
        ));
        registry
    }

    fn at(x: i32) -> ActorPosition {
        ActorPosition {
            actor: ActorId(1),
            dimension: overworld(),
            pos: BlockPos::new(x, 5, 5),
        }
    }

    #[test]
    fn tick_polls_only_on_interval() {
        let registry = registry();
        let mut tracker = LocationTracker::new(3);
        let actors = [at(5)];
        assert!(!tracker.tick(&registry, &actors, &mut NullSink));
        assert!(!tracker.tick(&registry, &actors, &mut NullSink));
        assert!(tracker.current_locations(ActorId(1)).is_none());
        assert!(tracker.tick(&registry, &actors, &mut NullSink));
        assert!(tracker.is_in_location(ActorId(1), &RegistryKey::voidworld("a")));
    }

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(LocationTracker::new(0).check_interval(), 1);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let registry = registry();
        let mut tracker = LocationTracker::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let calls = Rc::clone(&calls);
            tracker.on_enter(move |_, loc| calls.borrow_mut().push(format!("{tag}:{}", loc.id)));
        }
        tracker.poll(&registry, &at(5), &mut NullSink);
        assert_eq!(
            *calls.borrow(),
            vec!["first:voidworld:a".to_string(), "second:voidworld:a".to_string()]
        );
    }

    #[test]
    fn nested_regions_enter_and_exit_in_registration_order() {
        let mut registry = LocationRegistry::new();
        for (path, min, max) in [("z_city", 0, 50), ("a_district", 2, 20), ("m_room", 4, 8)] {
            registry.register(GameLocation::new(
                RegistryKey::voidworld(path),
                overworld(),
                BlockPos::new(min, 0, min),
                BlockPos::new(max, 10, max),
                LocationType::District,
            ));
        }
        let order = vec![
            RegistryKey::voidworld("z_city"),
            RegistryKey::voidworld("a_district"),
            RegistryKey::voidworld("m_room"),
        ];
        let mut tracker = LocationTracker::default();
        let actor = |x| ActorPosition {
            actor: ActorId(1),
            dimension: overworld(),
            pos: BlockPos::new(x, 5, x),
        };

        let result = tracker.poll(&registry, &actor(5), &mut NullSink);
        assert_eq!(result.entered, order);
        assert_eq!(tracker.current_locations(ActorId(1)), Some(order.as_slice()));

        let result = tracker.poll(&registry, &actor(100), &mut NullSink);
        assert_eq!(result.exited, order);
    }

    #[test]
    fn staying_inside_fires_nothing() {
        let registry = registry();
        let mut tracker = LocationTracker::default();
        assert_eq!(tracker.poll(&registry, &at(5), &mut NullSink).entered.len(), 1);
        assert!(tracker.poll(&registry, &at(6), &mut NullSink).is_empty());
    }

    #[test]
    fn unregistered_region_leaves_silently() {
        let mut registry = registry();
        let mut tracker = LocationTracker::default();
        let exits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&exits);
        tracker.on_exit(move |_, _| *counter.borrow_mut() += 1);

        tracker.poll(&registry, &at(5), &mut NullSink);
        registry.unregister(&RegistryKey::voidworld("a"));
        let result = tracker.poll(&registry, &at(5), &mut NullSink);
        assert!(result.exited.is_empty());
        assert_eq!(*exits.borrow(), 0);
        assert!(tracker.current_locations(ActorId(1)).unwrap().is_empty());
    }

    #[test]
    fn remove_actor_fires_no_exit() {
        let registry = registry();
        let mut tracker = LocationTracker::default();
        let exits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&exits);
        tracker.on_exit(move |_, _| *counter.borrow_mut() += 1);

        tracker.poll(&registry, &at(5), &mut NullSink);
        tracker.remove_actor(ActorId(1));
        assert_eq!(*exits.borrow(), 0);
        assert_eq!(tracker.tracked_actors().count(), 0);
    }
}
