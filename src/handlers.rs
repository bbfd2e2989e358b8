use crate::assistant::AssistantError;
use crate::errors::AppError;
use crate::metrics::{compute, insights, toggle};
use crate::models::{
    AppData, ChatEngine, ChatMessage, ChatRequest, ChatResponse, Habit, InsightsResponse,
    LoginRequest, MetricsSnapshot, NewHabitRequest, Profile, ProfileRequest, Session,
    SessionResponse, Speaker,
};
use crate::responder::{classify, introduction, respond};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Utc;
use tracing::{debug, info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    let name = data
        .profile
        .as_ref()
        .map(|p| p.full_name.as_str())
        .or(data.session.user_name.as_deref())
        .unwrap_or("there");
    Html(render_index(name))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let email = payload.email.trim();
    let user_name = email.split('@').next().unwrap_or_default();
    if user_name.is_empty() {
        return Err(AppError::bad_request("email is required"));
    }

    let mut data = state.data.lock().await;
    data.session = Session {
        logged_in: true,
        user_name: Some(user_name.to_string()),
    };
    persist_data(&state.data_path, &data).await?;
    info!(user = user_name, "logged in");

    Ok(Json(session_response(&data)))
}

pub async fn logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    *data = AppData::default();
    persist_data(&state.data_path, &data).await?;
    state.transcript.lock().await.clear();
    info!("logged out, local state cleared");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let data = state.data.lock().await;
    Json(session_response(&data))
}

pub async fn get_profile(State(state): State<AppState>) -> Result<Json<Profile>, AppError> {
    let data = state.data.lock().await;
    data.profile
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::not_found("profile has not been set up"))
}

pub async fn put_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = validate_profile(payload)?;

    let mut data = state.data.lock().await;
    data.profile = Some(profile.clone());
    persist_data(&state.data_path, &data).await?;
    // the greeting names the user, so start the conversation over
    state.transcript.lock().await.clear();
    info!(name = %profile.full_name, "profile saved");

    Ok(Json(profile))
}

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let data = state.data.lock().await;
    Json(data.habits.clone())
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("habit name must not be empty"));
    }

    let mut data = state.data.lock().await;
    let id = data.allocate_habit_id();
    let habit = Habit {
        created_at: Some(Utc::now()),
        ..Habit::new(id, name)
    };
    data.habits.push(habit.clone());
    persist_data(&state.data_path, &data).await?;
    info!(id, name, "habit added");

    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Habit>, AppError> {
    let mut data = state.data.lock().await;
    let updated = {
        let habit = data
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| AppError::not_found(format!("no habit with id {id}")))?;
        toggle(habit);
        habit.clone()
    };
    persist_data(&state.data_path, &data).await?;
    info!(id, completed = updated.completed, streak = updated.streak, "habit toggled");

    Ok(Json(updated))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    let index = data
        .habits
        .iter()
        .position(|h| h.id == id)
        .ok_or_else(|| AppError::not_found(format!("no habit with id {id}")))?;
    let removed = data.habits.remove(index);
    persist_data(&state.data_path, &data).await?;
    info!(id, name = %removed.name, "habit deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_metrics(
    State(state): State<AppState>,
) -> Result<Json<MetricsSnapshot>, AppError> {
    let data = state.data.lock().await;
    let profile = require_profile(&data)?;
    Ok(Json(compute(profile, &data.habits)))
}

pub async fn get_insights(
    State(state): State<AppState>,
) -> Result<Json<InsightsResponse>, AppError> {
    let data = state.data.lock().await;
    let profile = require_profile(&data)?;
    let metrics = compute(profile, &data.habits);
    Ok(Json(InsightsResponse {
        cards: insights(profile, &data.habits, &metrics),
    }))
}

pub async fn get_transcript(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    // data before transcript, the same order logout and put_profile take them
    let data = state.data.lock().await;
    let profile = require_profile(&data)?;
    let mut transcript = state.transcript.lock().await;
    seed_transcript(&mut transcript, profile);
    Ok(Json(transcript.clone()))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::bad_request("message must not be empty"));
    }

    // the remote call may be slow, so work from a copy of the state
    let (profile, habits) = {
        let data = state.data.lock().await;
        (require_profile(&data)?.clone(), data.habits.clone())
    };
    let metrics = compute(&profile, &habits);

    let rule_reply = || {
        let intent = classify(message, &habits);
        debug!(?intent, "rule engine answered");
        respond(message, &profile, &habits, &metrics)
    };

    let requested = payload.engine.unwrap_or(if state.assistant.is_some() {
        ChatEngine::Assistant
    } else {
        ChatEngine::Rules
    });

    let (content, engine, fallback) = match requested {
        ChatEngine::Rules => (rule_reply(), ChatEngine::Rules, None),
        ChatEngine::Assistant => {
            let remote = match &state.assistant {
                Some(assistant) => assistant.respond(message, &profile, &habits, &metrics).await,
                None => Err(AssistantError::NotConfigured),
            };
            match remote {
                Ok(content) => (content, ChatEngine::Assistant, None),
                Err(err) => {
                    warn!(kind = err.kind(), "assistant unavailable, using rule engine: {err}");
                    (rule_reply(), ChatEngine::Rules, Some(err.kind().to_string()))
                }
            }
        }
    };

    if !state.reply_delay.is_zero() {
        tokio::time::sleep(state.reply_delay).await;
    }

    // a logout or profile change while the reply was prepared wins
    let data = state.data.lock().await;
    if data.profile.as_ref() != Some(&profile) {
        return Err(AppError::conflict(
            "profile changed while the reply was prepared; send the message again",
        ));
    }
    let mut transcript = state.transcript.lock().await;
    seed_transcript(&mut transcript, &profile);
    push_message(&mut transcript, Speaker::User, message.to_string());
    let reply = push_message(&mut transcript, Speaker::Ai, content);

    Ok(Json(ChatResponse {
        reply,
        engine,
        fallback,
    }))
}

fn session_response(data: &AppData) -> SessionResponse {
    SessionResponse {
        logged_in: data.session.logged_in,
        user_name: data.session.user_name.clone(),
        profile_completed: data.profile.is_some(),
    }
}

fn require_profile(data: &AppData) -> Result<&Profile, AppError> {
    data.profile
        .as_ref()
        .ok_or_else(|| AppError::conflict("complete the profile setup first"))
}

fn validate_profile(payload: ProfileRequest) -> Result<Profile, AppError> {
    let full_name = payload.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::bad_request("fullName is required"));
    }
    let email = match payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
    {
        Some(email) if !email.contains('@') => {
            return Err(AppError::bad_request("email must contain '@'"));
        }
        other => other.map(str::to_string),
    };
    let missing = |field: &str| AppError::bad_request(format!("{field} is required"));

    Ok(Profile {
        full_name: full_name.to_string(),
        email,
        active_time: payload.active_time.ok_or_else(|| missing("activeTime"))?,
        daily_availability: payload
            .daily_availability
            .ok_or_else(|| missing("dailyAvailability"))?,
        habit_intensity: payload
            .habit_intensity
            .ok_or_else(|| missing("habitIntensity"))?,
        stress_sensitivity: payload
            .stress_sensitivity
            .ok_or_else(|| missing("stressSensitivity"))?,
    })
}

fn seed_transcript(transcript: &mut Vec<ChatMessage>, profile: &Profile) {
    if transcript.is_empty() {
        push_message(transcript, Speaker::Ai, introduction(profile));
    }
}

fn push_message(
    transcript: &mut Vec<ChatMessage>,
    speaker: Speaker,
    content: String,
) -> ChatMessage {
    let message = ChatMessage {
        id: transcript.len() as u64 + 1,
        speaker,
        content,
        sent_at: Utc::now(),
    };
    transcript.push(message.clone());
    message
}
