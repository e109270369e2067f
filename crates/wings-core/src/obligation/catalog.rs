//! Fixed description lists used by the built-in strategies.

use crate::state::Category;

/// Recovery protocols, rotated by completion count.
pub const GROUND_PROTOCOLS: [&str; 4] = [
    "10 minutes of physical movement. No phone.",
    "10 minutes sitting in silence. No inputs.",
    "Clean one specific surface area.",
    "Read 2 pages of something dense.",
];

/// Low-stimulation rules for boredom training.
pub const LOW_STIMULATION_RULES: [&str; 5] = [
    "Sit for 15 minutes with no screen, no music, no book.",
    "Walk for 20 minutes without headphones.",
    "Eat one meal without any input.",
    "Stare out of a window for 10 minutes. Let your mind wander.",
    "No phone for the first hour after waking.",
];

/// Flight prompts, used when a direction is anchoring the day.
pub const FLIGHT_PROMPTS: [&str; 3] = [
    "One uninterrupted block of deep work",
    "Ship one visible piece of progress",
    "Remove the single biggest blocker",
];

/// Light prompts per category.
pub fn light_prompts(category: Category) -> &'static [&'static str] {
    match category {
        Category::Body => &[
            "20 minutes of movement.",
            "Stretch for 15 minutes.",
            "Go outside and walk for 20 minutes.",
        ],
        Category::Order => &[
            "Clear one drawer or shelf completely.",
            "Process your inbox to zero.",
            "Reset your desk for tomorrow.",
        ],
        Category::Skill => &[
            "20 minutes of deliberate practice.",
            "Study one concept until you can explain it.",
            "Redo one exercise you got wrong before.",
        ],
        Category::Focus => &[
            "25 minutes single-tasking. Phone in another room.",
            "Write down the one thing that matters today, then do it.",
            "One focused block with notifications off.",
        ],
        Category::Flight => &FLIGHT_PROMPTS,
        Category::Ground => &GROUND_PROTOCOLS,
    }
}

/// Demanding prompts per category, used on high-energy days.
pub fn deep_prompts(category: Category) -> &'static [&'static str] {
    match category {
        Category::Body => &[
            "45 minutes of hard training.",
            "Run until it is uncomfortable, then five more minutes.",
        ],
        Category::Order => &[
            "Deep-clean one room.",
            "Close every open loop on your list older than a week.",
        ],
        Category::Skill => &[
            "60 minutes of practice at the edge of your ability.",
            "Build something small from scratch with what you learned.",
        ],
        Category::Focus => &[
            "90 minutes of deep work. No switching.",
            "Two focus blocks back to back.",
        ],
        Category::Flight => &FLIGHT_PROMPTS,
        Category::Ground => &GROUND_PROTOCOLS,
    }
}
