#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating game notifications into tile completions.

use std::collections::BTreeMap;

use waylock_core::{AreaId, Command, GameNotification, TaskBinding, TaskTrigger};

/// Per-area tables binding task tiles to their completing triggers.
///
/// The tables arrive as data; authoring them (wiki tooling and the like)
/// happens outside the engine.
#[derive(Clone, Debug, Default)]
pub struct TriggerTable {
    bindings: BTreeMap<AreaId, Vec<TaskBinding>>,
}

impl TriggerTable {
    /// Creates an empty trigger table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Builds a table from per-area binding lists.
    #[must_use]
    pub fn from_entries(entries: Vec<(AreaId, Vec<TaskBinding>)>) -> Self {
        Self {
            bindings: entries.into_iter().collect(),
        }
    }

    /// Appends a binding to an area's task list.
    pub fn bind(&mut self, area: AreaId, binding: TaskBinding) {
        self.bindings.entry(area).or_default().push(binding);
    }

    fn iter(&self) -> impl Iterator<Item = (&AreaId, &[TaskBinding])> {
        self.bindings
            .iter()
            .map(|(area, bindings)| (area, bindings.as_slice()))
    }
}

/// Pure system walking notification batches against the trigger tables.
///
/// Matching is exact table lookup, never heuristic: a chat trigger compares
/// the whole line verbatim, a stat trigger fires once the reported level
/// reaches its bar, an item trigger compares the item name verbatim.
#[derive(Clone, Debug, Default)]
pub struct TaskEvents {
    table: TriggerTable,
}

impl TaskEvents {
    /// Creates the system around the provided trigger tables.
    #[must_use]
    pub const fn new(table: TriggerTable) -> Self {
        Self { table }
    }

    /// Emits a completion command for every notification that satisfies a
    /// bound trigger.
    ///
    /// The world's completion handling is idempotent, so repeated matches
    /// for an already-completed tile are harmless.
    pub fn handle(&self, notifications: &[GameNotification], out: &mut Vec<Command>) {
        for notification in notifications {
            for (area, bindings) in self.table.iter() {
                for binding in bindings {
                    if trigger_matches(&binding.trigger, notification) {
                        out.push(Command::CompleteTile {
                            area: area.clone(),
                            tile: binding.tile,
                        });
                    }
                }
            }
        }
    }
}

fn trigger_matches(trigger: &TaskTrigger, notification: &GameNotification) -> bool {
    match (trigger, notification) {
        (TaskTrigger::ChatLine { text }, GameNotification::ChatLine { text: line }) => {
            text == line
        }
        (
            TaskTrigger::StatReached { skill, level },
            GameNotification::StatChanged {
                skill: changed,
                level: reached,
            },
        ) => skill == changed && reached >= level,
        (
            TaskTrigger::ItemObtained { item },
            GameNotification::ItemObtained { item: obtained },
        ) => item == obtained,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskEvents, TriggerTable};
    use waylock_core::{AreaId, Command, GameNotification, TaskBinding, TaskTrigger, TileId};

    fn table() -> TriggerTable {
        let mut table = TriggerTable::new();
        table.bind(
            AreaId::new("meadowvale"),
            TaskBinding::new(
                TileId::new(0, 1),
                TaskTrigger::ChatLine {
                    text: "You catch a trout.".to_owned(),
                },
            ),
        );
        table.bind(
            AreaId::new("meadowvale"),
            TaskBinding::new(
                TileId::new(1, 0),
                TaskTrigger::StatReached {
                    skill: "Woodcutting".to_owned(),
                    level: 20,
                },
            ),
        );
        table.bind(
            AreaId::new("thornwood"),
            TaskBinding::new(
                TileId::new(0, -1),
                TaskTrigger::ItemObtained {
                    item: "Thorn sigil".to_owned(),
                },
            ),
        );
        table
    }

    #[test]
    fn exact_chat_line_completes_its_tile() {
        let system = TaskEvents::new(table());
        let mut commands = Vec::new();

        system.handle(
            &[GameNotification::ChatLine {
                text: "You catch a trout.".to_owned(),
            }],
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::CompleteTile {
                area: AreaId::new("meadowvale"),
                tile: TileId::new(0, 1),
            }],
        );
    }

    #[test]
    fn near_miss_chat_lines_do_not_match() {
        let system = TaskEvents::new(table());
        let mut commands = Vec::new();

        system.handle(
            &[GameNotification::ChatLine {
                text: "You catch a salmon.".to_owned(),
            }],
            &mut commands,
        );

        assert!(commands.is_empty(), "matching is verbatim, not fuzzy");
    }

    #[test]
    fn stat_triggers_fire_at_or_above_their_bar() {
        let system = TaskEvents::new(table());
        let mut commands = Vec::new();

        system.handle(
            &[
                GameNotification::StatChanged {
                    skill: "Woodcutting".to_owned(),
                    level: 19,
                },
                GameNotification::StatChanged {
                    skill: "Woodcutting".to_owned(),
                    level: 21,
                },
                GameNotification::StatChanged {
                    skill: "Fishing".to_owned(),
                    level: 50,
                },
            ],
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::CompleteTile {
                area: AreaId::new("meadowvale"),
                tile: TileId::new(1, 0),
            }],
        );
    }

    #[test]
    fn one_batch_can_complete_tiles_in_several_areas() {
        let system = TaskEvents::new(table());
        let mut commands = Vec::new();

        system.handle(
            &[
                GameNotification::ItemObtained {
                    item: "Thorn sigil".to_owned(),
                },
                GameNotification::ChatLine {
                    text: "You catch a trout.".to_owned(),
                },
            ],
            &mut commands,
        );

        assert_eq!(commands.len(), 2);
        assert!(commands.contains(&Command::CompleteTile {
            area: AreaId::new("thornwood"),
            tile: TileId::new(0, -1),
        }));
    }
}
