#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a freshly restored profile.

use waylock_core::{Command, ProgressionConfig};
use waylock_world::{query, World};

/// Produces the commands that prepare a first run.
///
/// A profile is considered virgin when nothing is unlocked and both ledger
/// totals are zero; only then does the system emit the destructive
/// starting-points reset, followed by unlocks for every zero-cost home
/// area. Existing profiles receive no commands at all.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the command batch for a freshly restored world.
    #[must_use]
    pub fn initial_commands(&self, world: &World, config: &ProgressionConfig) -> Vec<Command> {
        let virgin = query::unlocked_ids(world).is_empty()
            && query::earned_total(world) == 0
            && query::spent_total(world) == 0;
        if !virgin {
            return Vec::new();
        }

        let mut commands = Vec::new();
        if config.starting_points > 0 {
            commands.push(Command::SetStartingPoints {
                points: config.starting_points,
            });
        }
        for area in query::areas(world) {
            if area.unlock_cost == 0 {
                commands.push(Command::UnlockArea { area: area.id });
            }
        }
        commands
    }
}
