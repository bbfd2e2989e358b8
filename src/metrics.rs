use crate::models::{
    Habit, InsightCard, MetricsSnapshot, Profile, StressLevel, StressSensitivity,
};

/// Average streak at which the streak half of the discipline score saturates.
const STREAK_SATURATION: f64 = 10.0;

pub fn compute(profile: &Profile, habits: &[Habit]) -> MetricsSnapshot {
    if habits.is_empty() {
        return MetricsSnapshot::default();
    }

    let total = habits.len() as f64;
    let completed = habits.iter().filter(|h| h.completed).count() as f64;
    let consistency = round_half_up(100.0 * completed / total) as u32;

    let streak_sum: f64 = habits.iter().map(|h| f64::from(h.streak)).sum();
    let streak = round_half_up(streak_sum / total) as u32;

    let streak_score = (f64::from(streak) / STREAK_SATURATION).min(1.0) * 5.0;
    let completion_score = f64::from(consistency) / 100.0 * 5.0;
    let discipline = round_half_up((streak_score + completion_score) * 10.0) / 10.0;

    MetricsSnapshot {
        consistency,
        streak,
        discipline,
        stress: stress_level(profile.stress_sensitivity, consistency),
    }
}

/// Low sensitivity tops out at `Medium`.
pub fn stress_level(sensitivity: StressSensitivity, consistency: u32) -> StressLevel {
    match sensitivity {
        StressSensitivity::High => match consistency {
            c if c < 60 => StressLevel::High,
            c if c < 80 => StressLevel::Medium,
            _ => StressLevel::Low,
        },
        StressSensitivity::Medium => match consistency {
            c if c < 40 => StressLevel::High,
            c if c < 70 => StressLevel::Medium,
            _ => StressLevel::Low,
        },
        StressSensitivity::Low => {
            if consistency < 30 {
                StressLevel::Medium
            } else {
                StressLevel::Low
            }
        }
    }
}

/// Flips today's completion and moves the streak with it, never below zero.
pub fn toggle(habit: &mut Habit) {
    habit.completed = !habit.completed;
    habit.streak = if habit.completed {
        habit.streak.saturating_add(1)
    } else {
        habit.streak.saturating_sub(1)
    };
}

/// Share of habits completed today, as a whole percentage.
pub fn completion_rate(habits: &[Habit]) -> u32 {
    if habits.is_empty() {
        return 0;
    }
    let completed = habits.iter().filter(|h| h.completed).count() as f64;
    round_half_up(100.0 * completed / habits.len() as f64) as u32
}

/// Dashboard cards shown next to the chat.
pub fn insights(profile: &Profile, habits: &[Habit], metrics: &MetricsSnapshot) -> Vec<InsightCard> {
    let card = |title: &str, body: String| InsightCard {
        title: title.to_string(),
        body,
    };

    if habits.is_empty() {
        return vec![
            card(
                "Patterns",
                "No habits added yet. Start by adding your first habit!".to_string(),
            ),
            card(
                "Performance",
                "Add habits to see personalized insights based on your patterns.".to_string(),
            ),
            card(
                "Recommendations",
                "Start with 2-3 simple habits that match your daily routine.".to_string(),
            ),
        ];
    }

    vec![
        card(
            "Patterns",
            format!(
                "You have {} active habits with {}% completion rate today.",
                habits.len(),
                metrics.consistency
            ),
        ),
        card(
            "Performance",
            format!(
                "Your {} intensity level shows discipline score of {}/10.",
                profile.habit_intensity, metrics.discipline
            ),
        ),
        card(
            "Recommendations",
            format!(
                "Focus on {} timing for optimal results with your {} schedule.",
                profile.active_time, profile.daily_availability
            ),
        ),
    ]
}

// Values here are never negative, so this matches the browser's Math.round.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
