use super::Schedule;
use crate::types::{ScheduleEntry, TimeOfDay};

/// Routine used on first run, before any `schedule.json` exists.
pub fn default_schedule() -> Schedule {
    let entries: [(u8, u8, ScheduleEntry); 6] = [
        (
            5,
            0,
            ScheduleEntry::new(
                "Start the day",
                "MORNING",
                "#FF6B35",
                &["Drink 1 litre of water", "Wash your face with cold water"],
            ),
        ),
        (
            7,
            0,
            ScheduleEntry::new(
                "Breakfast",
                "MORNING",
                "#FF6B35",
                &["Bread", "Peanut butter", "Egg whites"],
            ),
        ),
        (
            8,
            0,
            ScheduleEntry::new(
                "Pre-workout",
                "PREPARATION",
                "#E63946",
                &["Banana", "Black coffee", "Fill the water bottle"],
            ),
        ),
        (
            12,
            30,
            ScheduleEntry::new(
                "Lunch",
                "AFTERNOON",
                "#FFD166",
                &["Rice and beans", "Lean protein", "Salad"],
            ),
        ),
        (
            19,
            0,
            ScheduleEntry::new(
                "Dinner",
                "EVENING",
                "#7B2CBF",
                &["Light meal", "No screens after eating"],
            ),
        ),
        (
            22,
            0,
            ScheduleEntry::new(
                "Wind down",
                "EVENING",
                "#6B705C",
                &["Skin care", "Lay out tomorrow's clothes", "Lights out"],
            ),
        ),
    ];

    entries
        .into_iter()
        .filter_map(|(h, m, entry)| TimeOfDay::new(h, m).ok().map(|k| (k, entry)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::is_hex_color;

    #[test]
    fn test_default_schedule_entries_are_valid() {
        let schedule = default_schedule();
        assert_eq!(schedule.len(), 6);
        for (_, entry) in schedule.iter() {
            assert!(is_hex_color(&entry.color));
            assert!(!entry.body_lines.is_empty());
            assert_eq!(entry.clone().validated().unwrap(), *entry);
        }
    }
}
