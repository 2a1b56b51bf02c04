use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::debug;
use waylock_core::{
    AreaId, Command, Event, GameNotification, Position, TaskBinding, TaskTrigger, TileId,
    TileState, GRID_RADIUS,
};
use waylock_system_lock_gate::LockGate;
use waylock_system_task_events::{TaskEvents, TriggerTable};
use waylock_system_unlock::{UnlockInput, UnlockShop};
use waylock_world::{apply, query, World};

/// Derives a stable demo seed from the profile label.
///
/// The label is hashed together with a stream name so different demo
/// flavors draw independent sequences from the same profile.
pub(crate) fn derive_seed(profile: &str, stream: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(profile.as_bytes());
    hasher.update([0x1f]);
    hasher.update(stream.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Aggregated outcome of a scripted demo run.
#[derive(Debug)]
pub(crate) struct DemoReport {
    pub(crate) rounds: u32,
    pub(crate) tasks_completed: usize,
    pub(crate) tiles_claimed: usize,
    pub(crate) areas_unlocked: Vec<AreaId>,
    pub(crate) gate_checks_permitted: usize,
    pub(crate) gate_checks_total: usize,
}

/// Runs a deterministic scripted playthrough against the world.
///
/// Each round fakes one game notification through the task matcher, banks
/// whatever became claimable, consults the unlock shop for the cheapest
/// available expansion, and probes the lock gate at a random position.
/// Identical seeds replay identical sessions.
pub(crate) fn run(world: &mut World, rounds: u32, seed: u64) -> DemoReport {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shop = UnlockShop::new();
    let gate = LockGate::new();

    let mut tasks_completed = 0;
    let mut tiles_claimed = 0;
    let mut areas_unlocked = Vec::new();
    let mut gate_checks_permitted = 0;
    let mut gate_checks_total = 0;
    let radius = GRID_RADIUS as i32;

    // Unlock outcomes the shop has not observed yet; carried across rounds
    // so its pending request clears once the world answers.
    let mut unseen_outcomes: Vec<Event> = Vec::new();

    for round in 0..rounds {
        let unlocked = query::unlocked_ids(world);
        let Some(area) = pick(&mut rng, &unlocked) else {
            break;
        };
        let area = area.clone();
        let mut events = Vec::new();

        // The surrounding game reports a finished task; the matcher turns
        // the exact line into a completion command.
        let tile = TileId::new(
            rng.gen_range(-radius..=radius),
            rng.gen_range(-radius..=radius),
        );
        let line = format!("A landmark task near {area} is finished ({tile}).");
        let mut table = TriggerTable::new();
        table.bind(
            area.clone(),
            TaskBinding::new(tile, TaskTrigger::ChatLine { text: line.clone() }),
        );
        let matcher = TaskEvents::new(table);
        let mut commands = Vec::new();
        matcher.handle(&[GameNotification::ChatLine { text: line }], &mut commands);
        for command in commands {
            apply(world, command, &mut events);
        }

        // Bank everything that is sitting completed-unclaimed.
        if let Some(grid) = query::task_grid(world, &area) {
            for snapshot in grid.into_vec() {
                if snapshot.state == TileState::CompletedUnclaimed {
                    apply(
                        world,
                        Command::ClaimTile {
                            area: area.clone(),
                            tile: snapshot.tile,
                        },
                        &mut events,
                    );
                }
            }
        }

        // Expansion: request the cheapest candidate the gate admits.
        let request = query::unlock_candidates(world)
            .into_iter()
            .filter(|candidate| candidate.eligible && candidate.affordable)
            .min_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.id.cmp(&b.id)));
        let input = request
            .map(|candidate| UnlockInput::request(candidate.id))
            .unwrap_or_default();
        let mut commands = Vec::new();
        let candidates = query::unlock_candidates(world);
        shop.handle(
            &unseen_outcomes,
            input,
            |id| candidates.iter().any(|candidate| candidate.id == *id),
            &mut commands,
        );
        unseen_outcomes.clear();
        for command in commands {
            apply(world, command, &mut events);
        }
        unseen_outcomes.extend(events.iter().cloned().filter(|event| {
            matches!(
                event,
                Event::AreaUnlocked { .. } | Event::UnlockRejected { .. },
            )
        }));

        // Wander somewhere and ask the gate about it.
        let probe = Position::new(
            rng.gen_range(3100..3600),
            rng.gen_range(3100..3600),
            0,
        );
        gate_checks_total += 1;
        if gate.is_permitted(world, probe) {
            gate_checks_permitted += 1;
        }

        for event in &events {
            debug!("round {round}: {event:?}");
            match event {
                Event::TileCompleted { .. } => tasks_completed += 1,
                Event::TileClaimed { .. } => tiles_claimed += 1,
                Event::AreaUnlocked { area, .. } => areas_unlocked.push(area.clone()),
                _ => {}
            }
        }
    }

    DemoReport {
        rounds,
        tasks_completed,
        tiles_claimed,
        areas_unlocked,
        gate_checks_permitted,
        gate_checks_total,
    }
}

fn pick<'a, T>(rng: &mut ChaCha8Rng, values: &'a [T]) -> Option<&'a T> {
    if values.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..values.len());
    values.get(index)
}

#[cfg(test)]
mod tests {
    use super::{derive_seed, run};
    use waylock_core::ProgressionConfig;
    use waylock_system_bootstrap::Bootstrap;
    use waylock_world::{apply, query, World};

    fn bootstrapped_world() -> World {
        let config = ProgressionConfig {
            starting_points: 100,
            ..ProgressionConfig::default()
        };
        let mut world = World::new(config.clone());
        let mut events = Vec::new();
        for command in Bootstrap::default().initial_commands(&world, &config) {
            apply(&mut world, command, &mut events);
        }
        world
    }

    #[test]
    fn seed_derivation_is_stable_and_stream_sensitive() {
        let a = derive_seed("profile.json", "demo");
        let b = derive_seed("profile.json", "demo");
        let c = derive_seed("profile.json", "other");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn identical_seeds_replay_identical_sessions() {
        let mut first = bootstrapped_world();
        let mut second = bootstrapped_world();

        let report_a = run(&mut first, 24, 0xfeed);
        let report_b = run(&mut second, 24, 0xfeed);

        assert_eq!(report_a.tiles_claimed, report_b.tiles_claimed);
        assert_eq!(report_a.areas_unlocked, report_b.areas_unlocked);
        assert_eq!(query::earned_total(&first), query::earned_total(&second));
        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn demo_makes_progress_on_a_fresh_profile() {
        let mut world = bootstrapped_world();
        let report = run(&mut world, 48, 0x5eed);

        assert!(report.tasks_completed > 0, "tasks should complete");
        assert!(report.tiles_claimed > 0, "claims should land");
        assert!(query::earned_total(&world) > 0);
        assert_eq!(report.gate_checks_total, 48);
    }
}
