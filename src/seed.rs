use crate::models::Habit;

/// Bump whenever `DEFAULT_HABITS` changes so existing stores pick it up.
pub const SEED_VERSION: u32 = 1;

struct SeedHabit {
    id: &'static str,
    name: &'static str,
    active: bool,
    order: i32,
}

const DEFAULT_HABITS: &[SeedHabit] = &[
    SeedHabit { id: "4d208dd2-9d8f-4ebd-a043-b968da4abd60", name: "Eat well", active: true, order: 0 },
    SeedHabit { id: "d2f1b1c4-2acc-4fcc-af8c-8f75ce03e3c1", name: "Exercise", active: true, order: 1 },
    SeedHabit { id: "4d208dd2-9d8f-4ebd-a043-b968da4abd62", name: "Floss", active: true, order: 2 },
    SeedHabit { id: "4d208dd2-9d8f-4ebd-a043-b968da4abd64", name: "Stretch", active: true, order: 3 },
    SeedHabit { id: "4d208dd2-9d8f-4ebd-a043-b968da4abd68", name: "Old habit that I completed", active: false, order: 4 },
];

pub fn default_habits() -> Vec<Habit> {
    DEFAULT_HABITS
        .iter()
        .map(|seed| Habit {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            active: seed.active,
            order: seed.order,
        })
        .collect()
}
