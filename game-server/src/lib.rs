use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warp::Filter;
use warp::http::StatusCode;

use crate::auth::AuthService;
use game_core::GameSessionManager;
use game_persistence::UserRepository;
use game_types::{CaptionId, GameError, GameId, RoundId, User};

pub mod auth;
pub mod config;

#[derive(Deserialize)]
struct CreateUserRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct CreateUserResponse {
    user: User,
    token: String,
}

#[derive(Deserialize)]
struct SubmitAnswerRequest {
    /// Omitted or null means the round timed out without an answer.
    #[serde(default)]
    caption_id: Option<CaptionId>,
}

pub fn create_routes(
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
    user_repository: Arc<UserRepository>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let session_filter = warp::any().map({
        let session_manager = session_manager.clone();
        move || session_manager.clone()
    });

    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let user_repository_filter = warp::any().map({
        let user_repository = user_repository.clone();
        move || user_repository.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let create_user = warp::path("users")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(user_repository_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_create_user);

    let delete_user = warp::path!("users" / "me")
        .and(warp::delete())
        .and(warp::header::optional::<String>("authorization"))
        .and(user_repository_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_delete_user);

    // Guest play needs no token; the literal routes sit before the id routes.
    let guest_game = warp::path!("games" / "guest")
        .and(warp::post())
        .and(session_filter.clone())
        .and_then(handle_guest_game);

    let active_game = warp::path!("games" / "active")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_active_game);

    let create_game = warp::path("games")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_create_game);

    let list_games = warp::path("games")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_list_games);

    let get_game = warp::path!("games" / GameId)
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_get_game);

    let current_round = warp::path!("games" / GameId / "round")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_current_round);

    let submit_answer = warp::path!("games" / GameId / "round")
        .and(warp::post())
        .and(warp::body::json())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_submit_answer);

    let finish_game = warp::path!("games" / GameId / "finish")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_finish_game);

    let get_meme = warp::path!("memes" / i64)
        .and(warp::get())
        .and(session_filter.clone())
        .and_then(handle_get_meme);

    let get_caption = warp::path!("captions" / i64)
        .and(warp::get())
        .and(session_filter.clone())
        .and_then(handle_get_caption);

    let get_round = warp::path!("rounds" / RoundId)
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(session_filter.clone())
        .and(auth_filter.clone())
        .and_then(handle_get_round);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "DELETE"]);

    health
        .or(create_user)
        .or(delete_user)
        .or(guest_game)
        .or(active_game)
        .or(create_game)
        .or(list_games)
        .or(get_game)
        .or(current_round)
        .or(submit_answer)
        .or(finish_game)
        .or(get_meme)
        .or(get_caption)
        .or(get_round)
        .with(cors)
        .with(warp::log("meme_trivia"))
}

fn json_error(
    message: impl Into<String>,
    status: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message.into() })),
        status,
    )
}

fn error_reply(err: GameError) -> warp::reply::WithStatus<warp::reply::Json> {
    if let GameError::Storage { message } = &err {
        tracing::error!("storage failure: {message}");
    }
    let status = match err {
        GameError::ActiveGameAlreadyExists | GameError::InvalidRoundState => StatusCode::CONFLICT,
        GameError::GameNotFound | GameError::RoundNotFound | GameError::CaptionNotFound => {
            StatusCode::NOT_FOUND
        }
        GameError::NoContentAvailable => StatusCode::SERVICE_UNAVAILABLE,
        GameError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_error(err.to_string(), status)
}

fn authenticate(
    auth_header: Option<String>,
    auth_service: &AuthService,
) -> Result<User, warp::reply::WithStatus<warp::reply::Json>> {
    let Some(header) = auth_header else {
        return Err(json_error(
            "missing authorization header",
            StatusCode::UNAUTHORIZED,
        ));
    };
    let token = header.strip_prefix("Bearer ").unwrap_or(&header);
    auth_service
        .validate_token(token)
        .map_err(|_| json_error("invalid authentication token", StatusCode::UNAUTHORIZED))
}

async fn handle_create_user(
    request: CreateUserRequest,
    user_repository: Arc<UserRepository>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Ok(json_error(
            "username and password are required",
            StatusCode::BAD_REQUEST,
        ));
    }

    match user_repository.create_user(username, &request.password).await {
        Ok(Some(user)) => match auth_service.issue_token(&user.username) {
            Ok(token) => Ok(warp::reply::with_status(
                warp::reply::json(&CreateUserResponse { user, token }),
                StatusCode::CREATED,
            )),
            Err(err) => Ok(json_error(
                err.to_string(),
                StatusCode::INTERNAL_SERVER_ERROR,
            )),
        },
        Ok(None) => Ok(json_error("username already taken", StatusCode::CONFLICT)),
        Err(err) => {
            tracing::error!("user creation failed: {err}");
            Ok(json_error(
                "failed to create user",
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_delete_user(
    auth_header: Option<String>,
    user_repository: Arc<UserRepository>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match user_repository.delete_user(&user.username).await {
        Ok(true) => Ok(warp::reply::with_status(
            warp::reply::json(&serde_json::json!({ "status": "deleted" })),
            StatusCode::OK,
        )),
        Ok(false) => Ok(json_error("user not found", StatusCode::NOT_FOUND)),
        Err(err) => {
            tracing::error!("user deletion failed: {err}");
            Ok(json_error(
                "failed to delete user",
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn handle_guest_game(
    session_manager: Arc<GameSessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session_manager.create_guest_game().await {
        Ok(game) => Ok(warp::reply::with_status(
            warp::reply::json(&game),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_create_game(
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match session_manager.create_game(&user).await {
        Ok(game) => Ok(warp::reply::with_status(
            warp::reply::json(&game),
            StatusCode::CREATED,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_active_game(
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match session_manager.get_active_game(&user).await {
        Ok(game) => Ok(warp::reply::with_status(
            warp::reply::json(&game),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_list_games(
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match session_manager.list_games(&user).await {
        Ok(games) => Ok(warp::reply::with_status(
            warp::reply::json(&games),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_get_game(
    game_id: GameId,
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match session_manager.get_game(&user, game_id).await {
        Ok(game) => Ok(warp::reply::with_status(
            warp::reply::json(&game),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_current_round(
    game_id: GameId,
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    if let Err(err) = session_manager.get_game(&user, game_id).await {
        return Ok(error_reply(err));
    }

    // The body is the round, or null once every round is resolved.
    match session_manager.get_current_round(game_id).await {
        Ok(round) => Ok(warp::reply::with_status(
            warp::reply::json(&round),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_submit_answer(
    game_id: GameId,
    request: SubmitAnswerRequest,
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    if let Err(err) = session_manager.get_game(&user, game_id).await {
        return Ok(error_reply(err));
    }

    match session_manager
        .submit_answer(game_id, request.caption_id)
        .await
    {
        Ok(outcome) => Ok(warp::reply::with_status(
            warp::reply::json(&outcome),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_finish_game(
    game_id: GameId,
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    if let Err(err) = session_manager.finish_game(&user, game_id).await {
        return Ok(error_reply(err));
    }

    match session_manager.get_game(&user, game_id).await {
        Ok(game) => Ok(warp::reply::with_status(
            warp::reply::json(&game),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_get_meme(
    meme_id: i64,
    session_manager: Arc<GameSessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session_manager.meme_by_id(meme_id).await {
        Ok(Some(meme)) => Ok(warp::reply::with_status(
            warp::reply::json(&meme),
            StatusCode::OK,
        )),
        Ok(None) => Ok(json_error("meme not found", StatusCode::NOT_FOUND)),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_get_caption(
    caption_id: i64,
    session_manager: Arc<GameSessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match session_manager.caption_by_id(caption_id).await {
        Ok(caption) => Ok(warp::reply::with_status(
            warp::reply::json(&caption),
            StatusCode::OK,
        )),
        Err(err) => Ok(error_reply(err)),
    }
}

async fn handle_get_round(
    round_id: RoundId,
    auth_header: Option<String>,
    session_manager: Arc<GameSessionManager>,
    auth_service: Arc<AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = match authenticate(auth_header, &auth_service) {
        Ok(user) => user,
        Err(reply) => return Ok(reply),
    };

    match session_manager.get_round(round_id).await {
        Ok(round) => {
            // Rounds are visible to their game's owner only.
            if session_manager.get_game(&user, round.game_id).await.is_err() {
                return Ok(error_reply(GameError::RoundNotFound));
            }
            Ok(warp::reply::with_status(
                warp::reply::json(&round),
                StatusCode::OK,
            ))
        }
        Err(err) => Ok(error_reply(err)),
    }
}
