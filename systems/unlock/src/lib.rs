#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure unlock-shop system that turns player intent into unlock commands.

use waylock_core::{AreaId, Command, Event};

/// Input snapshot distilled from adapter-provided UI interactions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnlockInput {
    /// Area the player asked to purchase on this frame, if any.
    pub requested: Option<AreaId>,
}

impl UnlockInput {
    /// Creates an input descriptor requesting the provided area.
    #[must_use]
    pub fn request(area: AreaId) -> Self {
        Self {
            requested: Some(area),
        }
    }
}

/// Unlock-shop system that proposes purchases and awaits their outcome.
///
/// The system keeps at most one request in flight: once a command is
/// emitted, further intents are swallowed until the world answers with
/// either `AreaUnlocked` or `UnlockRejected`. The world remains the sole
/// authority on eligibility and funds.
#[derive(Clone, Debug, Default)]
pub struct UnlockShop {
    pending: Option<AreaId>,
}

impl UnlockShop {
    /// Creates a new unlock-shop system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Consumes world events and player input to emit unlock commands.
    ///
    /// The `is_candidate` closure should mirror the world's
    /// `query::unlock_candidates` surface so the shop only forwards areas
    /// currently offered to the player.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: UnlockInput,
        mut is_candidate: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(&AreaId) -> bool,
    {
        for event in events {
            match event {
                Event::AreaUnlocked { area, .. } | Event::UnlockRejected { area, .. } => {
                    if self.pending.as_ref() == Some(area) {
                        self.pending = None;
                    }
                }
                _ => {}
            }
        }

        let Some(requested) = input.requested else {
            return;
        };
        if self.pending.is_some() {
            return;
        }
        if !is_candidate(&requested) {
            return;
        }

        self.pending = Some(requested.clone());
        out.push(Command::UnlockArea { area: requested });
    }
}
