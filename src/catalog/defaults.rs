use super::{Activity, Category};

struct Preset {
    id: &'static str,
    name: &'static str,
    category: Category,
    total_hours: f64,
    sessions: u32,
    focus_minutes: u32,
    break_minutes: u32,
    color: &'static str,
    icon: &'static str,
    priority_order: u32,
}

const PRESETS: [Preset; 11] = [
    Preset { id: "1", name: "Internship 1", category: Category::Work, total_hours: 2., sessions: 2, focus_minutes: 55, break_minutes: 5, color: "blue", icon: "💼", priority_order: 0 },
    Preset { id: "2", name: "Internship 2", category: Category::Work, total_hours: 2., sessions: 2, focus_minutes: 55, break_minutes: 5, color: "blue", icon: "💼", priority_order: 1 },
    Preset { id: "3", name: "ML Internship", category: Category::Work, total_hours: 2., sessions: 2, focus_minutes: 55, break_minutes: 5, color: "purple", icon: "🤖", priority_order: 2 },
    Preset { id: "4", name: "Backlog Coverup", category: Category::Work, total_hours: 2., sessions: 2, focus_minutes: 55, break_minutes: 5, color: "orange", icon: "📝", priority_order: 3 },
    Preset { id: "5", name: "Learn DSA", category: Category::Learning, total_hours: 1.5, sessions: 2, focus_minutes: 45, break_minutes: 5, color: "green", icon: "📚", priority_order: 0 },
    Preset { id: "6", name: "Quantitative Finance", category: Category::Learning, total_hours: 1.5, sessions: 2, focus_minutes: 45, break_minutes: 5, color: "emerald", icon: "📊", priority_order: 1 },
    Preset { id: "7", name: "Interview Prep", category: Category::Learning, total_hours: 1.5, sessions: 2, focus_minutes: 45, break_minutes: 5, color: "yellow", icon: "🎯", priority_order: 2 },
    Preset { id: "8", name: ".NET Framework", category: Category::Learning, total_hours: 1.5, sessions: 2, focus_minutes: 45, break_minutes: 5, color: "violet", icon: "💻", priority_order: 3 },
    Preset { id: "9", name: "Sleep", category: Category::Health, total_hours: 7., sessions: 1, focus_minutes: 0, break_minutes: 0, color: "indigo", icon: "😴", priority_order: 0 },
    Preset { id: "10", name: "Workout", category: Category::Health, total_hours: 1., sessions: 1, focus_minutes: 0, break_minutes: 0, color: "red", icon: "💪", priority_order: 1 },
    Preset { id: "11", name: "Free Time", category: Category::Leisure, total_hours: 1.5, sessions: 1, focus_minutes: 0, break_minutes: 0, color: "pink", icon: "🎮", priority_order: 0 },
];

/// Built-in activity list used on first start and by `reset`.
pub fn default_activities() -> Vec<Activity> {
    PRESETS
        .iter()
        .map(|preset| Activity {
            id: preset.id.into(),
            name: preset.name.into(),
            category: preset.category,
            total_hours: preset.total_hours,
            sessions: preset.sessions,
            focus_minutes: preset.focus_minutes,
            break_minutes: preset.break_minutes,
            icon: preset.icon.into(),
            color: preset.color.into(),
            priority_order: preset.priority_order,
        })
        .collect()
}
