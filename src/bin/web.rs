//! Single binary web host: in-memory tournaments behind a REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).
//! Set TOURNAMENT_SEED to make every draw reproducible.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use petanque_tournament::logic::{pool_records, PoolRecord};
use petanque_tournament::{
    bracket, import_teams_csv, pool_outcome, rank_by_standings, record_score, set_bracket_winner,
    start_tournament, MatchRecord, Pool, PoolOutcome, TeamId, Tournament, TournamentError,
    TournamentFormat, TournamentId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-tournament entry: tournament data, its random source and last activity time.
struct TournamentEntry {
    tournament: Tournament,
    rng: StdRng,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// One pool table: seed order, per-team pool record and qualification state.
#[derive(serde::Serialize)]
struct PoolTable<'a> {
    pool: &'a Pool,
    records: HashMap<TeamId, PoolRecord>,
    outcome: PoolOutcome,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    #[serde(default = "default_courts")]
    courts: u32,
}

fn default_courts() -> u32 {
    4
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    #[serde(default)]
    players: Vec<String>,
}

#[derive(Deserialize)]
struct SetPoolsBody {
    pools: Vec<Vec<Uuid>>,
}

#[derive(Deserialize)]
struct ScoreBody {
    score1: u32,
    score2: u32,
}

#[derive(Deserialize)]
struct BracketWinnerBody {
    match_id: Uuid,
    team_id: Uuid,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id.
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: Uuid,
}

/// Path segments: tournament id and match id.
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: Uuid,
}

fn new_rng() -> StdRng {
    match std::env::var("TOURNAMENT_SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn bad_request(e: TournamentError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

/// Look up a tournament, refresh its activity time and hand it to `f`.
fn with_entry<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut TournamentEntry) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(entry)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" })),
    }
}

/// Run a mutation and answer with the updated tournament.
fn mutate<F>(state: &AppState, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament, &mut StdRng) -> Result<(), TournamentError>,
{
    with_entry(state, id, |entry| {
        match f(&mut entry.tournament, &mut entry.rng) {
            Ok(()) => HttpResponse::Ok().json(&entry.tournament),
            Err(e) => bad_request(e),
        }
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "petanque-tournament",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Option<Json<CreateTournamentBody>>) -> HttpResponse {
    let tournament = match body {
        Some(b) => Tournament::new(b.name.trim(), b.format, b.courts),
        None => Tournament::new("", TournamentFormat::default(), default_courts()),
    };
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created tournament {} ({:?})", id, tournament.format);
    let response = HttpResponse::Ok().json(&tournament);
    g.insert(
        id,
        TournamentEntry {
            tournament,
            rng: new_rng(),
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a tournament by id (404 if not found).
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |entry| HttpResponse::Ok().json(&entry.tournament))
}

/// Register a team (Setup only).
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<AddTeamBody>) -> HttpResponse {
    let body = body.into_inner();
    mutate(&state, path.id, move |t, _| t.add_team(body.name, body.players).map(|_| ()))
}

/// Register teams from a CSV body: one `name,player,...` row per team (Setup only).
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    mutate(&state, path.id, move |t, _| {
        import_teams_csv(t, body.as_bytes()).map(|_| ())
    })
}

/// Withdraw a team (Setup only). Clears the pools.
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: AppState, path: Path<TournamentTeamPath>) -> HttpResponse {
    let team_id = path.team_id;
    mutate(&state, path.id, move |t, _| t.remove_team(team_id))
}

/// Install the pool partition computed by the client (Setup only, pools format).
#[put("/api/tournaments/{id}/pools")]
async fn api_set_pools(state: AppState, path: Path<TournamentPath>, body: Json<SetPoolsBody>) -> HttpResponse {
    let pools = body.into_inner().pools;
    mutate(&state, path.id, move |t, _| t.set_pools(pools))
}

/// Start the tournament (Setup -> Running) and derive the first matches.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |t, rng| start_tournament(t, rng))
}

/// Enter a match score; newly unlocked matches are derived right away.
#[put("/api/tournaments/{id}/matches/{match_id}/score")]
async fn api_set_score(state: AppState, path: Path<TournamentMatchPath>, body: Json<ScoreBody>) -> HttpResponse {
    let match_id = path.match_id;
    mutate(&state, path.id, move |t, rng| {
        record_score(t, match_id, body.score1, body.score2, rng)
    })
}

/// Legacy flat match records, for hosts persisting the old storage shape.
#[get("/api/tournaments/{id}/matches/records")]
async fn api_match_records(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |entry| {
        let records: Vec<MatchRecord> = entry.tournament.matches.iter().map(MatchRecord::from).collect();
        HttpResponse::Ok().json(records)
    })
}

/// Teams ranked by wins, then performance.
#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |entry| {
        HttpResponse::Ok().json(rank_by_standings(&entry.tournament.teams))
    })
}

/// Pool tables, in pool order.
#[get("/api/tournaments/{id}/pools")]
async fn api_pools(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |entry| {
        let t = &entry.tournament;
        let tables: Vec<PoolTable> = t
            .pools
            .iter()
            .map(|pool| PoolTable {
                pool,
                records: pool_records(pool, &t.matches),
                outcome: pool_outcome(pool, &t.matches),
            })
            .collect();
        HttpResponse::Ok().json(tables)
    })
}

/// Current elimination bracket (404 until every pool is decided).
#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    with_entry(&state, path.id, |entry| match bracket(&entry.tournament) {
        Some(b) => HttpResponse::Ok().json(b),
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket yet" })),
    })
}

/// Record the winner of an elimination match (last write wins).
#[put("/api/tournaments/{id}/bracket/winner")]
async fn api_bracket_winner(state: AppState, path: Path<TournamentPath>, body: Json<BracketWinnerBody>) -> HttpResponse {
    let BracketWinnerBody { match_id, team_id } = body.into_inner();
    mutate(&state, path.id, move |t, rng| set_bracket_winner(t, match_id, team_id, rng))
}

/// Restart tournament: back to Setup with the same teams.
#[post("/api/tournaments/{id}/restart")]
async fn api_restart_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, |t, _| t.restart_tournament())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_add_team)
            .service(api_import_teams)
            .service(api_remove_team)
            .service(api_set_pools)
            .service(api_start_tournament)
            .service(api_set_score)
            .service(api_match_records)
            .service(api_standings)
            .service(api_pools)
            .service(api_bracket)
            .service(api_bracket_winner)
            .service(api_restart_tournament)
    })
    .bind(bind)?
    .run()
    .await
}
