//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::allocation::{AllocationError, Allocator, AttemptState, BookingAttempt, ProtocolError};
use crate::domain::{DepartureTime, DomainError, GroupId, Train};
use crate::store::{PresetName, PresetSummary, ScheduleStore, StoreError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule", get(get_schedule))
        .route("/trains", post(add_train))
        .route("/trains/:time", put(update_train).delete(remove_train))
        .route("/bookings", post(create_booking))
        .route("/groups/:id", delete(remove_group))
        .route("/presets", get(list_presets))
        .route("/presets/:name", put(save_preset).delete(delete_preset))
        .route("/presets/:name/load", post(load_preset))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn parse_departure(s: &str) -> Result<DepartureTime, AppError> {
    DepartureTime::parse_hhmm(s).map_err(|e| AppError::BadRequest {
        message: format!("invalid departure time '{}': {}", s, e),
    })
}

/// The day's trains, their carriages and bookings.
async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let schedule = state.store.lock().await.load()?;
    Ok(Json(ScheduleResponse::new(
        &schedule,
        state.now(),
        query.upcoming,
    )))
}

/// Add an empty train.
async fn add_train(
    State(state): State<AppState>,
    Json(req): Json<NewTrainRequest>,
) -> Result<(StatusCode, Json<TrainView>), AppError> {
    let train = match req.capacities {
        Some(capacities) => Train::with_capacities(req.departure, capacities)?,
        None => Train::standard(req.departure),
    };
    let view = TrainView::from_train(&train, state.now());

    let mut store = state.store.lock().await;
    let mut schedule = store.load()?;
    schedule.add_train(train)?;
    store.replace(&schedule)?;

    info!(train = %req.departure, "train added");
    Ok((StatusCode::CREATED, Json(view)))
}

/// Retime a train or change its service flags.
async fn update_train(
    State(state): State<AppState>,
    Path(time): Path<String>,
    Json(req): Json<TrainUpdateRequest>,
) -> Result<Json<TrainView>, AppError> {
    let departure = parse_departure(&time)?;
    let now = state.now();

    let mut store = state.store.lock().await;
    let mut schedule = store.load()?;

    let target = match req.departure {
        Some(to) => {
            schedule.retime_train(departure, to)?;
            to
        }
        None => departure,
    };

    let train = schedule.update_train(target, |train| {
        if let Some(cancelled) = req.cancelled {
            train.set_cancelled(cancelled);
        }
        if let Some(party_train) = req.party_train {
            train.set_party_train(party_train);
        }
        if let Some(school) = &req.school_name {
            train.set_school_name(school);
        }
    })?;
    let view = TrainView::from_train(train, now);
    store.replace(&schedule)?;

    info!(train = %departure, now_departs = %target, "train updated");
    Ok(Json(view))
}

/// Remove a train along with any bookings aboard.
async fn remove_train(
    State(state): State<AppState>,
    Path(time): Path<String>,
) -> Result<Json<RemovedTrainResponse>, AppError> {
    let departure = parse_departure(&time)?;

    let mut store = state.store.lock().await;
    let mut schedule = store.load()?;
    let train = schedule.remove_train(departure)?;
    store.replace(&schedule)?;

    let group_ids = train.group_ids();
    info!(train = %departure, bookings = group_ids.len(), "train removed");
    Ok(Json(RemovedTrainResponse {
        departure,
        group_ids,
    }))
}

/// Book a group, or continue a booking with the operator's answer.
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let request = req.group_request();

    let mut attempt = match (req.pending, req.answer) {
        (Some(pending), Some(answer)) => {
            debug!(group_id = %pending.group_id, reason = %pending.reason, ?answer, "applying answer");
            let mut attempt = BookingAttempt::awaiting(request, req.decisions, pending);
            attempt.answer(answer)?;
            attempt
        }
        (None, Some(_)) => return Err(ProtocolError::NothingPending.into()),
        _ => BookingAttempt::with_decisions(request, req.decisions),
    };

    let now = state.now();
    let mut store = state.store.lock().await;
    let mut schedule = store.load()?;

    let allocator = Allocator::new(&state.config);
    if let AttemptState::Committed(_) = attempt.resolve(&allocator, &mut schedule, now)? {
        store.replace(&schedule)?;
    }

    let (request, decisions, attempt_state) = attempt.into_parts();
    let outcome = attempt_state.into_outcome().ok_or_else(|| AppError::Internal {
        message: "booking attempt did not run".to_string(),
    })?;
    Ok(Json(BookingResponse::new(outcome, request, decisions)))
}

/// Cancel a group's booking.
async fn remove_group(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<RemovedGroupResponse>, AppError> {
    let group_id = GroupId::new(id).ok_or_else(|| AppError::BadRequest {
        message: format!("invalid group id: {}", id),
    })?;

    let mut store = state.store.lock().await;
    let mut schedule = store.load()?;
    let released = schedule.remove_group(group_id);
    if released == 0 {
        return Err(AppError::NotFound {
            message: format!("no booking for group {}", group_id),
        });
    }
    store.replace(&schedule)?;

    info!(group_id = %group_id, released, "group removed");
    Ok(Json(RemovedGroupResponse { group_id, released }))
}

/// Saved presets, newest first.
async fn list_presets(
    State(state): State<AppState>,
) -> Result<Json<PresetListResponse>, AppError> {
    let presets = state.store.lock().await.list_presets()?;
    Ok(Json(PresetListResponse { presets }))
}

/// Save the live schedule under a name.
async fn save_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PresetSummary>, AppError> {
    let name = PresetName::parse(&name)?;

    let mut store = state.store.lock().await;
    let schedule = store.load()?;
    if schedule.is_empty() {
        return Err(AppError::BadRequest {
            message: "no schedule to save".to_string(),
        });
    }

    let saved_at = Utc::now();
    store.save_preset(&name, &schedule, saved_at)?;

    info!(preset = %name, trains = schedule.len(), "preset saved");
    Ok(Json(PresetSummary {
        name,
        saved_at,
        trains: schedule.len(),
    }))
}

/// Replace the live schedule with a preset.
async fn load_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let name = PresetName::parse(&name)?;
    let schedule = state.store.lock().await.activate_preset(&name)?;

    info!(preset = %name, trains = schedule.len(), "preset loaded");
    Ok(Json(ScheduleResponse::new(&schedule, state.now(), false)))
}

async fn delete_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeletedPresetResponse>, AppError> {
    let name = PresetName::parse(&name)?;
    let deleted = state.store.lock().await.delete_preset(&name)?;

    info!(preset = %name, deleted, "preset delete requested");
    Ok(Json(DeletedPresetResponse {
        name: name.into(),
        deleted,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let message = e.to_string();
        match e {
            DomainError::DuplicateDeparture(_) => AppError::Conflict { message },
            DomainError::UnknownTrain(_) => AppError::NotFound { message },
            _ => AppError::BadRequest { message },
        }
    }
}

impl From<AllocationError> for AppError {
    fn from(e: AllocationError) -> Self {
        let message = e.to_string();
        match e {
            AllocationError::Validation(_) => AppError::BadRequest { message },
            AllocationError::GroupIdInUse(_) => AppError::Conflict { message },
            AllocationError::Commit(_) => AppError::Internal { message },
        }
    }
}

impl From<ProtocolError> for AppError {
    fn from(e: ProtocolError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::MissingPreset(_) => AppError::NotFound { message },
            StoreError::InvalidName => AppError::BadRequest { message },
            StoreError::Io { .. } | StoreError::Json { .. } => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            warn!(%status, error = %message, "request failed");
        } else {
            debug!(%status, error = %message, "request refused");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{
        AllocationConfig, ConfirmationReason, Decision, Decisions, apply_decision,
    };
    use crate::domain::{CarriageNumber, Schedule};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn time(s: &str) -> DepartureTime {
        DepartureTime::parse_hhmm(s).unwrap()
    }

    fn state_at(now: NaiveDateTime) -> AppState {
        let schedule = Schedule::standard([time("10:00"), time("11:00"), time("12:00")]).unwrap();
        AppState::new(MemoryStore::new(schedule), AllocationConfig::default()).with_clock(move || now)
    }

    fn state() -> AppState {
        state_at(at(8, 0))
    }

    async fn book(state: &AppState, body: serde_json::Value) -> Result<BookingResponse, AppError> {
        let req: BookingRequest = serde_json::from_value(body).unwrap();
        create_booking(State(state.clone()), Json(req))
            .await
            .map(|Json(r)| r)
    }

    async fn live(state: &AppState) -> Schedule {
        state.store.lock().await.load().unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn booking_is_committed_and_stored() {
        let state = state();
        let response = book(&state, json!({"adults": 2, "children": 1})).await.unwrap();

        let BookingStatus::Committed { booking } = &response.status else {
            panic!("expected commit, got {:?}", response.status);
        };
        assert_eq!(booking.departure, time("10:00"));
        assert_eq!(response.request.group_id, Some(GroupId::FIRST));
        assert_eq!(response.message, "Carriage 2 on the 10:00 train, group size 3");

        let schedule = live(&state).await;
        assert_eq!(schedule.booking(GroupId::FIRST).as_ref(), Some(booking));
    }

    #[tokio::test]
    async fn imminent_prompt_round_trip() {
        let state = state_at(at(9, 55));
        let first = book(&state, json!({"adults": 2, "children": 0})).await.unwrap();

        let BookingStatus::AwaitingConfirmation { pending } = &first.status else {
            panic!("expected prompt, got {:?}", first.status);
        };
        assert_eq!(pending.reason, ConfirmationReason::ImminentDeparture { minutes: 5 });
        assert!(live(&state).await.bookings().is_empty());

        let second = book(
            &state,
            json!({
                "adults": 2,
                "children": 0,
                "group_id": first.request.group_id,
                "decisions": first.decisions,
                "pending": pending,
                "answer": "decline",
            }),
        )
        .await
        .unwrap();

        let BookingStatus::Committed { booking } = second.status else {
            panic!("expected commit");
        };
        assert_eq!(booking.departure, time("11:00"));
        assert_eq!(booking.group_id, pending.group_id);
        assert_eq!(second.decisions.imminent_departure, Some(false));
    }

    #[tokio::test]
    async fn accepted_prompt_books_the_imminent_train() {
        let state = state_at(at(9, 55));
        let first = book(&state, json!({"adults": 1, "children": 0, "toddlers": 1}))
            .await
            .unwrap();
        let BookingStatus::AwaitingConfirmation { pending } = first.status else {
            panic!("expected prompt");
        };

        let second = book(
            &state,
            json!({
                "adults": 1,
                "children": 0,
                "toddlers": 1,
                "pending": pending,
                "answer": "accept",
            }),
        )
        .await
        .unwrap();
        let BookingStatus::Committed { booking } = second.status else {
            panic!("expected commit");
        };
        assert_eq!(booking.departure, time("10:00"));
        assert_eq!(second.request.group_id, Some(pending.group_id));
        assert_eq!(second.decisions.imminent_departure, Some(true));
        assert_eq!(live(&state).await.booking(pending.group_id), Some(booking));
    }

    #[tokio::test]
    async fn answer_without_prompt_is_refused() {
        let err = book(&state(), json!({"adults": 1, "children": 0, "answer": "accept"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn invalid_group_is_bad_request() {
        let err = book(&state(), json!({"adults": 0, "children": 2})).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn reused_group_id_conflicts() {
        let state = state();
        book(&state, json!({"adults": 2, "children": 0})).await.unwrap();
        let err = book(&state, json!({"adults": 3, "children": 0, "group_id": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn rejection_leaves_schedule_alone() {
        let state = state_at(at(13, 0));
        let response = book(&state, json!({"adults": 2, "children": 0})).await.unwrap();
        assert!(matches!(response.status, BookingStatus::Rejected { .. }));
        assert_eq!(live(&state).await, live(&state_at(at(8, 0))).await);
    }

    #[tokio::test]
    async fn schedule_view_filters_departed() {
        let state = state_at(at(10, 30));
        let Json(all) = get_schedule(State(state.clone()), Query(ScheduleQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.trains.len(), 3);

        let Json(upcoming) = get_schedule(State(state), Query(ScheduleQuery { upcoming: true }))
            .await
            .unwrap();
        let times: Vec<DepartureTime> = upcoming.trains.iter().map(|t| t.departure).collect();
        assert_eq!(times, vec![time("11:00"), time("12:00")]);
    }

    #[tokio::test]
    async fn add_and_remove_trains() {
        let state = state();
        let (status, Json(view)) = add_train(
            State(state.clone()),
            Json(NewTrainRequest {
                departure: time("09:30"),
                capacities: Some([2, 4, 4, 2, 2, 4, 4, 3]),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.free_seats, 25);
        assert_eq!(live(&state).await.trains()[0].departure(), time("09:30"));

        let dup = add_train(
            State(state.clone()),
            Json(NewTrainRequest {
                departure: time("10:00"),
                capacities: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(dup, AppError::Conflict { .. }));

        book(&state, json!({"adults": 2, "children": 0})).await.unwrap();
        let Json(removed) = remove_train(State(state.clone()), Path("09:30".to_string()))
            .await
            .unwrap();
        assert_eq!(removed.group_ids, vec![GroupId::FIRST]);
        assert_eq!(live(&state).await.len(), 3);

        let missing = remove_train(State(state.clone()), Path("09:30".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound { .. }));

        let bad = remove_train(State(state), Path("9.30".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(bad, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn update_retimes_and_flags() {
        let state = state();
        let Json(view) = update_train(
            State(state.clone()),
            Path("10:00".to_string()),
            Json(TrainUpdateRequest {
                departure: Some(time("10:15")),
                school_name: Some("St Mary's".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.departure, time("10:15"));
        assert!(!view.accepts_public_bookings);

        let schedule = live(&state).await;
        assert!(schedule.train(time("10:00")).is_none());
        assert_eq!(
            schedule.train(time("10:15")).map(|t| t.school_name().to_string()),
            Some("St Mary's".to_string())
        );

        // the school train is passed over
        let response = book(&state, json!({"adults": 1, "children": 0})).await.unwrap();
        let BookingStatus::Committed { booking } = response.status else {
            panic!("expected commit");
        };
        assert_eq!(booking.departure, time("11:00"));

        let clash = update_train(
            State(state),
            Path("11:00".to_string()),
            Json(TrainUpdateRequest {
                departure: Some(time("12:00")),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(clash, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn remove_group_frees_carriages() {
        let state = state();
        book(&state, json!({"adults": 4, "children": 4})).await.unwrap();

        let Json(removed) = remove_group(State(state.clone()), Path(1)).await.unwrap();
        assert_eq!(removed.released, 2);
        assert!(live(&state).await.bookings().is_empty());

        let again = remove_group(State(state.clone()), Path(1)).await.unwrap_err();
        assert!(matches!(again, AppError::NotFound { .. }));

        let zero = remove_group(State(state), Path(0)).await.unwrap_err();
        assert!(matches!(zero, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn preset_endpoints() {
        let state = state();
        let Json(saved) = save_preset(State(state.clone()), Path(" Summer ".to_string()))
            .await
            .unwrap();
        assert_eq!(saved.name.as_str(), "Summer");
        assert_eq!(saved.trains, 3);

        // change the live schedule, then load the preset back over it
        remove_train(State(state.clone()), Path("12:00".to_string()))
            .await
            .unwrap();
        let Json(loaded) = load_preset(State(state.clone()), Path("Summer".to_string()))
            .await
            .unwrap();
        assert_eq!(loaded.trains.len(), 3);
        assert_eq!(live(&state).await.len(), 3);

        let Json(list) = list_presets(State(state.clone())).await.unwrap();
        assert_eq!(list.presets.len(), 1);

        let Json(deleted) = delete_preset(State(state.clone()), Path("Summer".to_string()))
            .await
            .unwrap();
        assert!(deleted.deleted);
        let Json(deleted) = delete_preset(State(state.clone()), Path("Summer".to_string()))
            .await
            .unwrap();
        assert!(!deleted.deleted);

        let missing = load_preset(State(state.clone()), Path("Summer".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound { .. }));

        let blank = save_preset(State(state), Path("  ".to_string())).await.unwrap_err();
        assert!(matches!(blank, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn empty_schedule_cannot_be_saved() {
        let state = AppState::new(MemoryStore::default(), AllocationConfig::default());
        let err = save_preset(State(state), Path("Empty".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (AppError::from(StoreError::InvalidName), StatusCode::BAD_REQUEST),
            (
                AppError::from(StoreError::MissingPreset("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(DomainError::DuplicateDeparture(time("10:00"))),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(StoreError::Io {
                    message: "disk full".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(DomainError::CarriageOccupied(CarriageNumber::WHEELCHAIR)),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn answer_applies_to_request() {
        // a declined pair prompt passes over the train it was about
        let mut decisions = Decisions::default();
        let mut request = crate::domain::GroupRequest::new(2, 1, 0, 0);
        let pending = crate::allocation::PendingConfirmation {
            group_id: GroupId::FIRST,
            reason: ConfirmationReason::PairOnly {
                pair: crate::allocation::CarriagePair::FourFive,
            },
            train: time("10:00"),
            carriages: Vec::new(),
        };
        apply_decision(&mut request, &mut decisions, &pending, Decision::Decline);
        assert!(decisions.is_skipped(time("10:00")));
        assert_eq!(request.group_id, Some(GroupId::FIRST));
    }
}
