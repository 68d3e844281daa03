//! Headless admin console: one actor driving a [`WorldSession`] over an
//! in-memory world.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use voidworld_core::{ActorId, BlockPos, Facing, RegistryKey};
use voidworld_testkit::{EventLog, EventRecord, JsonlSink, RecordingSink};
use voidworld_world::{
    ActorPosition, MemoryWorld, MessageChannel, NamedBlockCatalog, WorldSession,
    DEFAULT_NEAREST_RADIUS,
};

use crate::commands::{
    help_lines, parse_command, BootstrapTarget, CommandOutput, ConsoleCommand, CoordTriple,
};
use crate::config::VoidWorldConfig;

const CONSOLE_ACTOR: ActorId = ActorId(1);

/// Short dimension names accepted by `/dim`.
const DIMENSION_ALIASES: &[(&str, &str, &str)] = &[
    ("overworld", "minecraft", "overworld"),
    ("nether", "minecraft", "the_nether"),
    ("end", "minecraft", "the_end"),
    ("cosmic_platform", "voidworld", "cosmic_platform"),
    ("consciousness_planet", "voidworld", "consciousness_planet"),
];

fn resolve_dimension(name: &str) -> Option<RegistryKey> {
    let name = name.trim().to_ascii_lowercase();
    DIMENSION_ALIASES
        .iter()
        .find(|(alias, _, _)| *alias == name)
        .and_then(|(_, namespace, path)| RegistryKey::new(namespace, path).ok())
        .or_else(|| RegistryKey::parse_with_default_namespace(&name, "minecraft").ok())
}

pub struct Console {
    session: WorldSession,
    world: MemoryWorld,
    catalog: NamedBlockCatalog,
    actor_name: String,
    dimension: RegistryKey,
    pos: BlockPos,
    export_path: PathBuf,
    max_ticks: u32,
    messages: RecordingSink,
    transitions: EventLog,
    event_sink: Option<JsonlSink>,
}

impl Console {
    pub fn new(config: &VoidWorldConfig) -> Self {
        let catalog = config.block_catalog();
        let world = MemoryWorld::new(DIMENSION_ALIASES.iter().filter_map(|(alias, _, _)| resolve_dimension(alias)))
            .with_catalog(&catalog);
        let dimension = resolve_dimension(&config.console.start_dimension)
            .filter(|dim| world.dimensions().any(|known| known == dim))
            .unwrap_or_else(|| {
                warn!(
                    "Unknown start dimension {}. Using overworld",
                    config.console.start_dimension
                );
                RegistryKey::minecraft("overworld")
            });

        let mut session = WorldSession::new(config.session_config());
        let transitions = EventLog::attach(session.tracker_mut());

        Self {
            session,
            world,
            catalog,
            actor_name: config.console.actor_name.clone(),
            dimension,
            pos: BlockPos::new(0, 65, 0),
            export_path: config.export_path.clone(),
            max_ticks: config.console.max_ticks.max(1),
            messages: RecordingSink::new(),
            transitions,
            event_sink: None,
        }
    }

    /// Mirror tracker transitions and executed commands into a JSONL log.
    pub fn with_event_log(mut self, sink: JsonlSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// World start.
    pub fn init(&mut self) -> CommandOutput {
        let report = self.session.init();
        let mut out = CommandOutput::default();
        if report.loaded > 0 || report.failed > 0 {
            out.push(format!(
                "Loaded {} locations ({} failed)",
                report.loaded, report.failed
            ));
        }
        out
    }

    pub fn shutdown(&mut self) {
        self.session.on_actor_leave(CONSOLE_ACTOR);
        self.session.shutdown();
    }

    /// Parse and run one input line. Errors become `Error: ...` lines.
    pub fn run_line(&mut self, line: &str) -> CommandOutput {
        self.record("command", line);
        match parse_command(line) {
            Ok(cmd) => self.execute(cmd),
            Err(err) => {
                let mut out = CommandOutput::default();
                out.error(err);
                out
            }
        }
    }

    pub fn execute(&mut self, cmd: ConsoleCommand) -> CommandOutput {
        let mut out = CommandOutput::default();
        match cmd {
            ConsoleCommand::Help => out.lines.extend(help_lines()),
            ConsoleCommand::Status => self.status(&mut out),
            ConsoleCommand::LocationCreate { id, kind, name_key } => {
                let (dimension, pos) = (self.dimension.clone(), self.pos);
                let (selector, registry) = self.session.selector_and_registry();
                let created = selector.create(
                    CONSOLE_ACTOR,
                    registry,
                    &id,
                    &kind,
                    name_key.as_deref(),
                    &dimension,
                    pos,
                    &mut self.messages,
                );
                if let Err(err) = created {
                    self.messages.take();
                    out.error(err);
                }
            }
            ConsoleCommand::LocationList => self.location_list(&mut out),
            ConsoleCommand::LocationInfo => {
                let registry = self.session.registry();
                let here = registry.locations_at(&self.dimension, self.pos);
                if here.is_empty() {
                    out.push("You are not inside any registered location.");
                } else {
                    out.push("=== Current locations ===");
                    for loc in here {
                        out.push(format!(
                            "  {} [{}] protection={}",
                            loc.id,
                            loc.kind,
                            loc.protection_level.as_deref().unwrap_or("none")
                        ));
                    }
                }
            }
            ConsoleCommand::LocationExport { path } => {
                let path = path.unwrap_or_else(|| self.export_path.clone());
                match self.session.registry().export_file(&path) {
                    Ok(count) => out.push(format!("Exported {count} locations to: {}", path.display())),
                    Err(err) => out.error(err),
                }
            }
            ConsoleCommand::LocationImport { path } => {
                match self.session.registry_mut().load_file(&path) {
                    Ok(count) => out.push(format!("Imported {count} locations from: {}", path.display())),
                    Err(err) => out.error(err),
                }
            }
            ConsoleCommand::LocationTp { id } => self.location_tp(&id, &mut out),
            ConsoleCommand::Wand { at } => {
                let pos = self.resolve(at);
                self.session.mark(CONSOLE_ACTOR, pos, &mut self.messages);
            }
            ConsoleCommand::Bootstrap { target } => self.bootstrap(target, &mut out),
            ConsoleCommand::StructureList => {
                let ids = self.session.structures_mut().available_ids();
                if ids.is_empty() {
                    out.push("No structures found.");
                } else {
                    out.push(format!("=== Structures ({}) ===", ids.len()));
                    out.lines.extend(ids.into_iter().map(|id| format!("  {id}")));
                }
            }
            ConsoleCommand::StructurePlace { id, at, facing } => {
                let origin = self.resolve(at);
                let facing = facing.unwrap_or(Facing::South);
                let placed = self.session.place(
                    &mut self.world,
                    &self.catalog,
                    &id,
                    &self.dimension,
                    origin,
                    facing,
                    CONSOLE_ACTOR,
                );
                match placed {
                    Some(report) => out.push(format!(
                        "Placed {id} at {origin} facing {facing}: {} blocks ({} skipped)",
                        report.written, report.skipped
                    )),
                    None => out.error(format!("Structure not found: {id}")),
                }
            }
            ConsoleCommand::Undo => {
                let last = self.session.history().summary(CONSOLE_ACTOR).pop();
                match last {
                    Some((structure, _)) => {
                        let restored = self.session.undo(CONSOLE_ACTOR, &mut self.world, &self.catalog);
                        out.push(format!("Undid {structure}: {restored} blocks removed"));
                    }
                    None => out.push("Nothing to undo."),
                }
            }
            ConsoleCommand::History => {
                let entries = self.session.history().summary(CONSOLE_ACTOR);
                if entries.is_empty() {
                    out.push("No placements recorded.");
                } else {
                    out.push(format!("=== Placement history ({}) ===", entries.len()));
                    for (index, (structure, blocks)) in entries.iter().enumerate().rev() {
                        out.push(format!("  #{} {structure} ({blocks} blocks)", index + 1));
                    }
                }
            }
            ConsoleCommand::Tick { count } => {
                if count > self.max_ticks {
                    out.push(format!("Tick count capped at {}", self.max_ticks));
                }
                let count = count.min(self.max_ticks);
                let actor = ActorPosition {
                    actor: CONSOLE_ACTOR,
                    dimension: self.dimension.clone(),
                    pos: self.pos,
                };
                let mut polls = 0;
                for _ in 0..count {
                    if self.session.on_tick([&actor], &mut self.messages) {
                        polls += 1;
                    }
                    self.flush_transitions();
                }
                out.push(format!(
                    "Advanced {count} ticks to tick {} ({polls} polls)",
                    self.session.current_tick().0
                ));
            }
            ConsoleCommand::Tp { at } => {
                self.pos = self.resolve(at);
                out.push(format!("Teleported to {}", self.pos));
            }
            ConsoleCommand::Dim { name } => self.change_dimension(&name, &mut out),
        }
        self.drain_messages(&mut out);
        out
    }

    fn resolve(&self, at: CoordTriple) -> BlockPos {
        BlockPos::new(
            at.x.resolve(self.pos.x),
            at.y.resolve(self.pos.y),
            at.z.resolve(self.pos.z),
        )
    }

    fn status(&self, out: &mut CommandOutput) {
        let registry = self.session.registry();
        out.push("====== VoidWorld Status ======");
        out.push(format!("  Actor: {} ({CONSOLE_ACTOR})", self.actor_name));
        out.push(format!("  Dimension: {}", self.dimension));
        out.push(format!("  Position: {}", self.pos));
        out.push(format!("  Registered locations: {}", registry.len()));
        let here = registry.locations_at(&self.dimension, self.pos);
        if here.is_empty() {
            out.push("  You are in: [wilderness / unregistered area]");
        } else {
            let names: Vec<String> = here.iter().map(|loc| format!("{} [{}]", loc.id, loc.kind)).collect();
            out.push(format!("  You are in: {}", names.join(", ")));
        }
        if let Some(nearest) = registry.find_nearest(&self.dimension, self.pos, DEFAULT_NEAREST_RADIUS, None) {
            out.push(format!(
                "  Nearest: {} ({:.0} blocks)",
                nearest.id,
                nearest.center().distance_to(self.pos)
            ));
        }
        out.push(format!("  Tick: {}", self.session.current_tick().0));
    }

    fn location_list(&self, out: &mut CommandOutput) {
        let mut locations: Vec<_> = self.session.registry().all().collect();
        if locations.is_empty() {
            out.push("No locations registered.");
            return;
        }
        locations.sort_by(|a, b| a.id.to_string().cmp(&b.id.to_string()));
        out.push(format!("=== Locations ({}) ===", locations.len()));
        for loc in locations {
            let (width, depth) = loc.footprint();
            out.push(format!(
                "  {} [{}] ({width}x{depth}) at {}",
                loc.id, loc.kind, loc.dimension
            ));
        }
    }

    fn location_tp(&mut self, id: &str, out: &mut CommandOutput) {
        let key = match RegistryKey::parse(id) {
            Ok(key) => key,
            Err(_) => {
                out.error(format!("Invalid location ID: {id}"));
                return;
            }
        };
        let Some(location) = self.session.registry().get(&key) else {
            out.error(format!("Location not found: {key}"));
            return;
        };
        self.dimension = location.dimension.clone();
        self.pos = location.spawn_or_center();
        out.push(format!("Teleported to {key} at {}", self.pos));
    }

    fn bootstrap(&mut self, target: BootstrapTarget, out: &mut CommandOutput) {
        match target {
            BootstrapTarget::All => {
                out.push("Bootstrapping all dimensions...");
                let count = self.session.bootstrap_all(&mut self.world, &self.catalog);
                out.push(format!(
                    "Done! Placed outlines for {count} locations across all dimensions."
                ));
            }
            BootstrapTarget::Dimension(name) => {
                if self.session.bootstrapper().layout().dimension(&name).is_none() {
                    let known = self.session.bootstrapper().layout().names().join(", ");
                    out.error(format!("Unknown dimension for bootstrap: {name}. Known: {known}"));
                    return;
                }
                out.push(format!("Bootstrapping dimension: {name}..."));
                let count = self
                    .session
                    .bootstrap_dimension(&name, &mut self.world, &self.catalog);
                out.push(format!("Done! Placed outlines for {count} locations in {name}."));
            }
        }
    }

    fn change_dimension(&mut self, name: &str, out: &mut CommandOutput) {
        let Some(dimension) = resolve_dimension(name).filter(|dim| self.world.dimensions().any(|known| known == dim)) else {
            out.error(format!("Unknown dimension: {name}"));
            return;
        };
        self.dimension = dimension;
        out.push(format!("Switched to {}", self.dimension));

        let layout_name = self
            .session
            .bootstrapper()
            .layout()
            .dimensions()
            .iter()
            .find(|entry| entry.dimension == self.dimension)
            .map(|entry| entry.name.clone());
        if let Some(layout_name) = layout_name {
            let count = self
                .session
                .ensure_bootstrapped(&layout_name, &mut self.world, &self.catalog);
            if count > 0 {
                out.push(format!("First visit: placed outlines for {count} locations."));
            }
        }
    }

    fn drain_messages(&mut self, out: &mut CommandOutput) {
        for message in self.messages.take() {
            match message.channel {
                MessageChannel::Chat => out.push(message.text),
                MessageChannel::ActionBar => out.push(format!("[action bar] {}", message.text)),
            }
        }
    }

    fn flush_transitions(&mut self) {
        let tick = self.session.current_tick();
        for event in self.transitions.take() {
            debug!(actor = %event.actor, location = %event.location, kind = event.transition.as_str(), "transition");
            let payload = event.location.to_string();
            self.write_event(EventRecord {
                tick,
                kind: event.transition.as_str(),
                actor: event.actor,
                payload: &payload,
            });
        }
    }

    fn record(&mut self, kind: &str, payload: &str) {
        let tick = self.session.current_tick();
        self.write_event(EventRecord {
            tick,
            kind,
            actor: CONSOLE_ACTOR,
            payload,
        });
    }

    fn write_event(&mut self, event: EventRecord<'_>) {
        if let Some(sink) = self.event_sink.as_mut() {
            if let Err(err) = sink.write(&event) {
                warn!("Failed to write event log entry: {err:#}");
                self.event_sink = None;
            }
        }
    }
}

/// Run every non-blank, non-comment line of `script` and collect the output.
pub fn run_script(console: &mut Console, script: &str) -> Vec<String> {
    let mut transcript = Vec::new();
    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        transcript.extend(console.run_line(line).lines);
    }
    transcript
}

/// Load a script from disk and run it.
pub fn run_script_file(console: &mut Console, path: &Path) -> Result<Vec<String>> {
    let script = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    info!(path = %path.display(), "running console script");
    Ok(run_script(console, &script))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use voidworld_testkit::temp_dir;
    use voidworld_world::{generate, Archetype, BlockCatalog, WorldAccess};

    fn console_with(structures: Option<&Path>) -> Console {
        let mut config = VoidWorldConfig::default();
        config.tracker.check_interval = 1;
        if let Some(dir) = structures {
            config.structures_dir = dir.to_path_buf();
        }
        Console::new(&config)
    }

    #[test]
    fn wand_then_create_registers_region() {
        let mut console = console_with(None);
        let transcript = run_script(
            &mut console,
            "/vw wand 5 5 5\n/vw wand 1 10 2\n/vw location create plaza district\n",
        );
        assert_eq!(
            transcript,
            vec![
                "Corner 1 set: [5, 5, 5]",
                "Corner 2 set: [1, 10, 2]",
                "Selection: 5x6x4 blocks (120 total)",
                "Location created: voidworld:plaza",
                "Bounds: [1, 5, 2] to [5, 10, 5]",
            ]
        );
        assert!(console
            .session
            .registry()
            .get(&RegistryKey::voidworld("plaza"))
            .is_some());
    }

    #[test]
    fn failures_print_error_lines() {
        let mut console = console_with(None);
        let out = console.run_line("/vw location create plaza district");
        assert_eq!(out.lines, vec!["Error: No selection! Mark both corners first."]);
        let out = console.run_line("/vw structure place nowhere 0 64 0");
        assert_eq!(out.lines, vec!["Error: Structure not found: nowhere"]);
        let out = console.run_line("/bogus");
        assert_eq!(out.lines, vec!["Error: Unknown command: bogus. Try /help"]);
    }

    #[test]
    fn ticking_inside_a_region_announces_entry() {
        let mut console = console_with(None);
        run_script(
            &mut console,
            "/vw wand 0 60 0\n/vw wand 10 70 10\n/vw location create yard room\n/tp 5 65 5\n",
        );
        let out = console.run_line("/vw tick");
        assert_eq!(
            out.lines,
            vec![
                "Advanced 1 ticks to tick 1 (1 polls)".to_string(),
                "[action bar] location.voidworld.yard".to_string(),
            ]
        );
    }

    #[test]
    fn tick_count_is_capped() {
        let mut config = VoidWorldConfig::default();
        config.console.max_ticks = 50;
        let mut console = Console::new(&config);
        let out = console.run_line("/vw tick 4000000000");
        assert_eq!(
            out.lines,
            vec!["Tick count capped at 50", "Advanced 50 ticks to tick 50 (5 polls)"]
        );
        assert_eq!(console.session.current_tick().0, 50);
    }

    #[test]
    fn placing_at_the_coordinate_limit_skips_out_of_range_cells() {
        let dir = temp_dir("console_edge_structures");
        let wall = generate(Archetype::FortressWall);
        fs::write(dir.join("wall_fortress.json"), wall.to_json_pretty().unwrap()).unwrap();
        let mut console = console_with(Some(&dir));

        let out = console.run_line("/vw structure place wall_fortress 2147483647 64 0");
        assert!(out.lines[0].starts_with("Placed wall_fortress at [2147483647, 64, 0]"));
        let overworld = RegistryKey::minecraft("overworld");
        let corner = console.world.block_at(&overworld, BlockPos::new(i32::MAX, 64, 0));
        assert_eq!(console.catalog.name_of(corner.id), Some("minecraft:stone_bricks"));
        assert!(console.run_line("/vw undo").lines[0].starts_with("Undid wall_fortress"));
        assert_eq!(console.world.solid_count(&overworld), 0);
    }

    #[test]
    fn place_and_undo_structure() {
        let dir = temp_dir("console_structures");
        let wall = generate(Archetype::FortressWall);
        fs::write(dir.join("wall_fortress.json"), wall.to_json_pretty().unwrap()).unwrap();
        let mut console = console_with(Some(&dir));

        let out = console.run_line("/vw structure list");
        assert_eq!(out.lines, vec!["=== Structures (1) ===", "  wall_fortress"]);

        let out = console.run_line("/vw structure place wall_fortress 0 64 0 north");
        assert_eq!(out.lines.len(), 1);
        assert!(out.lines[0].starts_with("Placed wall_fortress at [0, 64, 0] facing north"));
        let brick = console.world.block_at(&RegistryKey::minecraft("overworld"), BlockPos::new(0, 64, 0));
        assert_eq!(console.catalog.name_of(brick.id), Some("minecraft:stone_bricks"));

        let out = console.run_line("/vw history");
        assert_eq!(out.lines[0], "=== Placement history (1) ===");
        let out = console.run_line("/vw undo");
        assert!(out.lines[0].starts_with("Undid wall_fortress"));
        assert_eq!(console.world.solid_count(&RegistryKey::minecraft("overworld")), 0);
        assert_eq!(console.run_line("/vw undo").lines, vec!["Nothing to undo."]);
    }

    #[test]
    fn first_visit_bootstraps_custom_dimension() {
        let mut console = console_with(None);
        let out = console.run_line("/dim cosmic_platform");
        assert_eq!(
            out.lines,
            vec![
                "Switched to voidworld:cosmic_platform".to_string(),
                "First visit: placed outlines for 5 locations.".to_string(),
            ]
        );
        let out = console.run_line("/dim cosmic_platform");
        assert_eq!(out.lines, vec!["Switched to voidworld:cosmic_platform"]);
        let out = console.run_line("/vw location tp cosmic_lab");
        assert_eq!(out.lines, vec!["Teleported to voidworld:cosmic_lab at [0, 65, -50]"]);
    }

    #[test]
    fn export_then_import_round_trips_regions() {
        let dir = temp_dir("console_export");
        let path = dir.join("regions.json");
        let mut console = console_with(None);
        run_script(&mut console, "/vw wand 0 0 0\n/vw wand 3 3 3\n/vw location create shed building\n");

        let out = console.run_line(&format!("/vw location export {}", path.display()));
        assert_eq!(out.lines, vec![format!("Exported 1 locations to: {}", path.display())]);

        let mut fresh = console_with(None);
        let out = fresh.run_line(&format!("/vw location import {}", path.display()));
        assert_eq!(out.lines, vec![format!("Imported 1 locations from: {}", path.display())]);
        assert_eq!(fresh.session.registry().len(), 1);
    }
}
