use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTime {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl fmt::Display for ActiveTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActiveTime::Morning => "morning",
            ActiveTime::Afternoon => "afternoon",
            ActiveTime::Evening => "evening",
            ActiveTime::Night => "night",
        })
    }
}

/// Hours per day the user can put into habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyAvailability {
    #[serde(rename = "1-2")]
    OneToTwo,
    #[serde(rename = "3-4")]
    ThreeToFour,
    #[serde(rename = "5-6")]
    FiveToSix,
    #[serde(rename = "7+")]
    SevenPlus,
}

impl fmt::Display for DailyAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DailyAvailability::OneToTwo => "1-2",
            DailyAvailability::ThreeToFour => "3-4",
            DailyAvailability::FiveToSix => "5-6",
            DailyAvailability::SevenPlus => "7+",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitIntensity {
    Beginner,
    Moderate,
    Aggressive,
}

impl fmt::Display for HabitIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HabitIntensity::Beginner => "beginner",
            HabitIntensity::Moderate => "moderate",
            HabitIntensity::Aggressive => "aggressive",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressSensitivity {
    Low,
    Medium,
    High,
}

impl fmt::Display for StressSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StressSensitivity::Low => "low",
            StressSensitivity::Medium => "medium",
            StressSensitivity::High => "high",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub active_time: ActiveTime,
    pub daily_availability: DailyAvailability,
    pub habit_intensity: HabitIntensity,
    pub stress_sensitivity: StressSensitivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: u64,
    pub name: String,
    pub completed: bool,
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Habit {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
            streak: 0,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StressLevel::Low => "Low",
            StressLevel::Medium => "Medium",
            StressLevel::High => "High",
        })
    }
}

/// Derived on every read; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub consistency: u32,
    pub streak: u32,
    pub discipline: f64,
    pub stress: StressLevel,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            consistency: 0,
            streak: 0,
            discipline: 0.0,
            stress: StressLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Everything the state file holds.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub next_habit_id: u64,
}

impl AppData {
    pub fn allocate_habit_id(&mut self) -> u64 {
        let used = self.habits.iter().map(|h| h.id).max().unwrap_or(0);
        self.next_habit_id = self.next_habit_id.max(used).saturating_add(1);
        self.next_habit_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    #[serde(rename = "type")]
    pub speaker: Speaker,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Login is simulated; any password is accepted, so it is not read.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub logged_in: bool,
    pub user_name: Option<String>,
    pub profile_completed: bool,
}

/// Profile form as submitted; every field is checked before it becomes a [`Profile`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub active_time: Option<ActiveTime>,
    pub daily_availability: Option<DailyAvailability>,
    pub habit_intensity: Option<HabitIntensity>,
    pub stress_sensitivity: Option<StressSensitivity>,
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatEngine {
    Rules,
    Assistant,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub engine: Option<ChatEngine>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: ChatMessage,
    pub engine: ChatEngine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightCard {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub cards: Vec<InsightCard>,
}
