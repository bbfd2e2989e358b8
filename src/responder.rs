//! Rule-based chat replies narrating a user's habit data.
//!
//! A message is lower-cased and trimmed, then checked against the rule table in
//! order; the first rule whose trigger fires produces the reply. The final
//! rule always fires, so every message gets an answer.

use crate::metrics::completion_rate;
use crate::models::{Habit, MetricsSnapshot, Profile, StressLevel};
use once_cell::sync::Lazy;
use regex::Regex;

static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(hi|hello|hey+|hii+|heyy+|sup|what's up|wassup)$").expect("greeting pattern")
});
static SMALL_TALK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(how are you|how's it going|what's up)$").expect("small talk pattern")
});
static GRATITUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(thanks|thank you|thx)$").expect("gratitude pattern"));

/// Which rule answered a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    SmallTalk,
    Gratitude,
    NoHabits,
    Stress,
    Discipline,
    Consistency,
    Recommendation,
    Summary,
}

enum Trigger {
    /// Whole message matches.
    Pattern(&'static Lazy<Regex>),
    /// Message contains any of the keywords.
    Keywords(&'static [&'static str]),
    NoHabits,
    Always,
}

struct Rule {
    intent: Intent,
    trigger: Trigger,
    reply: fn(&Context<'_>) -> String,
}

static RULES: [Rule; 9] = [
    Rule {
        intent: Intent::Greeting,
        trigger: Trigger::Pattern(&GREETING),
        reply: greeting,
    },
    Rule {
        intent: Intent::SmallTalk,
        trigger: Trigger::Pattern(&SMALL_TALK),
        reply: small_talk,
    },
    Rule {
        intent: Intent::Gratitude,
        trigger: Trigger::Pattern(&GRATITUDE),
        reply: gratitude,
    },
    Rule {
        intent: Intent::NoHabits,
        trigger: Trigger::NoHabits,
        reply: no_habits,
    },
    Rule {
        intent: Intent::Stress,
        trigger: Trigger::Keywords(&["stress", "burnout"]),
        reply: stress,
    },
    Rule {
        intent: Intent::Discipline,
        trigger: Trigger::Keywords(&["discipline", "score"]),
        reply: discipline,
    },
    Rule {
        intent: Intent::Consistency,
        trigger: Trigger::Keywords(&["consistency", "improve"]),
        reply: consistency,
    },
    Rule {
        intent: Intent::Recommendation,
        trigger: Trigger::Keywords(&["habit", "focus", "what", "should"]),
        reply: recommendation,
    },
    Rule {
        intent: Intent::Summary,
        trigger: Trigger::Always,
        reply: summary,
    },
];

struct Context<'a> {
    profile: &'a Profile,
    habits: &'a [Habit],
    metrics: &'a MetricsSnapshot,
    incomplete: Vec<&'a Habit>,
    completion_rate: u32,
}

impl<'a> Context<'a> {
    fn new(profile: &'a Profile, habits: &'a [Habit], metrics: &'a MetricsSnapshot) -> Self {
        Self {
            profile,
            habits,
            metrics,
            incomplete: habits.iter().filter(|h| !h.completed).collect(),
            completion_rate: completion_rate(habits),
        }
    }

    fn name(&self) -> &str {
        &self.profile.full_name
    }
}

impl Trigger {
    fn fires(&self, message: &str, habits: &[Habit]) -> bool {
        match self {
            Trigger::Pattern(pattern) => pattern.is_match(message),
            Trigger::Keywords(words) => words.iter().any(|w| message.contains(w)),
            Trigger::NoHabits => habits.is_empty(),
            Trigger::Always => true,
        }
    }
}

fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

fn matching_rule(message: &str, habits: &[Habit]) -> &'static Rule {
    let message = normalize(message);
    RULES
        .iter()
        .find(|rule| rule.trigger.fires(&message, habits))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// The rule that would answer `message` given the current habit list.
pub fn classify(message: &str, habits: &[Habit]) -> Intent {
    matching_rule(message, habits).intent
}

pub fn respond(
    message: &str,
    profile: &Profile,
    habits: &[Habit],
    metrics: &MetricsSnapshot,
) -> String {
    let rule = matching_rule(message, habits);
    (rule.reply)(&Context::new(profile, habits, metrics))
}

/// Opening line of a fresh chat transcript.
pub fn introduction(profile: &Profile) -> String {
    format!(
        "Hi {}! I'm your personal habit analyst. I can help you understand your patterns, \
         optimize your routines, and provide insights based on your data. What would you like to know?",
        profile.full_name
    )
}

/// Habit with the longest streak; earliest wins ties, and an all-zero list has none.
pub fn best_habit(habits: &[Habit]) -> Option<&Habit> {
    habits.iter().fold(None::<&Habit>, |best, current| {
        let to_beat = best.map_or(0, |b| b.streak);
        if current.streak > to_beat { Some(current) } else { best }
    })
}

/// Habit with the shortest streak; earliest wins ties.
pub fn struggling_habit(habits: &[Habit]) -> Option<&Habit> {
    habits.iter().fold(None::<&Habit>, |worst, current| match worst {
        Some(w) if current.streak >= w.streak => Some(w),
        _ => Some(current),
    })
}

/// Struggling habits get called out only below this streak.
const STRUGGLING_BELOW: u32 = 7;

fn greeting(ctx: &Context<'_>) -> String {
    format!(
        "Hey {}! How can I help you today? I can analyze your habit patterns, explain your metrics, \
         or give you personalized recommendations based on your data.",
        ctx.name()
    )
}

fn small_talk(ctx: &Context<'_>) -> String {
    format!(
        "I'm doing great, thanks for asking {}! I'm here to help you understand your habit data \
         and optimize your routines. What would you like to explore?",
        ctx.name()
    )
}

fn gratitude(ctx: &Context<'_>) -> String {
    format!(
        "You're welcome {}! Feel free to ask me anything about your habits, stress patterns, \
         or performance trends.",
        ctx.name()
    )
}

fn no_habits(ctx: &Context<'_>) -> String {
    format!(
        "{}, I notice you haven't added any habits yet. Would you like me to suggest some habits \
         based on your {} intensity level and {} preference?",
        ctx.name(),
        ctx.profile.habit_intensity,
        ctx.profile.active_time
    )
}

fn stress(ctx: &Context<'_>) -> String {
    let outlook = if ctx.metrics.stress == StressLevel::Low {
        "well-managed"
    } else {
        "elevated"
    };
    let pressure = if ctx.incomplete.is_empty() {
        "Your completed habits today suggest good stress management.".to_string()
    } else {
        let names: Vec<&str> = ctx.incomplete.iter().map(|h| h.name.as_str()).collect();
        format!(
            "Today's incomplete habits ({}) might be contributing to pressure.",
            names.join(", ")
        )
    };
    format!(
        "{}, looking at your stress patterns: Your {} stress sensitivity combined with {} intensity \
         shows your current {} stress level is {}. {}",
        ctx.name(),
        ctx.profile.stress_sensitivity,
        ctx.profile.habit_intensity,
        ctx.metrics.stress,
        outlook,
        pressure
    )
}

fn discipline(ctx: &Context<'_>) -> String {
    let mut parts = vec![format!(
        "{}, your discipline analysis: Current score of {}/10 reflects your {} approach.",
        ctx.name(),
        ctx.metrics.discipline,
        ctx.profile.habit_intensity
    )];
    if let Some(best) = best_habit(ctx.habits) {
        parts.push(format!(
            "Your strongest habit {} ({} day streak) shows what you're capable of.",
            best.name, best.streak
        ));
    }
    if let Some(worst) = struggling_habit(ctx.habits).filter(|h| h.streak < STRUGGLING_BELOW) {
        parts.push(format!(
            "{} at {} days needs more focus.",
            worst.name, worst.streak
        ));
    }
    parts.join(" ")
}

fn consistency(ctx: &Context<'_>) -> String {
    let next = match ctx.incomplete.first() {
        Some(habit) => format!(
            "Focus on {} next - it fits your {} schedule.",
            habit.name, ctx.profile.daily_availability
        ),
        None => "Excellent work completing all habits today!".to_string(),
    };
    format!(
        "{}, consistency breakdown: {}% over {} days with your {} timing preference. \
         Today you're at {}% completion. {}",
        ctx.name(),
        ctx.metrics.consistency,
        ctx.metrics.streak,
        ctx.profile.active_time,
        ctx.completion_rate,
        next
    )
}

fn recommendation(ctx: &Context<'_>) -> String {
    if let Some(first) = ctx.incomplete.first() {
        return format!(
            "{}, here's what I recommend: You have {} habits left today. Start with {} \
             ({} day streak) since your {} energy is best for this type of activity.",
            ctx.name(),
            ctx.incomplete.len(),
            first.name,
            first.streak,
            ctx.profile.active_time
        );
    }

    let mut parts = vec![format!(
        "{}, amazing! You've completed all {} habits today.",
        ctx.name(),
        ctx.habits.len()
    )];
    if let Some(best) = best_habit(ctx.habits) {
        parts.push(format!(
            "{} is clearly working well with {} days.",
            best.name, best.streak
        ));
    }
    let stage = if ctx.metrics.consistency > 85 {
        "ready for new challenges"
    } else {
        "building solid foundations"
    };
    parts.push(format!(
        "With {}% consistency, you're {}.",
        ctx.metrics.consistency, stage
    ));
    parts.join(" ")
}

fn summary(ctx: &Context<'_>) -> String {
    format!(
        "{}, I can help you with several things: analyze your {}% consistency, explain your {}/10 \
         discipline score, review your {}% completion rate today, or suggest optimizations for \
         your {} routine. What interests you most?",
        ctx.name(),
        ctx.metrics.consistency,
        ctx.metrics.discipline,
        ctx.completion_rate,
        ctx.profile.active_time
    )
}
