//! Setup phase: team import and start (transition from Setup to Running).

use crate::logic::progression::refresh;
use crate::models::{Tournament, TournamentError, TournamentFormat, TournamentState};
use rand::Rng;
use std::collections::HashSet;
use std::io::Read;

/// Register teams from headerless CSV rows `name,player,player,...`.
/// Blank rows are skipped. Returns the number of teams added.
pub fn import_teams_csv<R: Read>(
    tournament: &mut Tournament,
    reader: R,
) -> Result<usize, TournamentError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut added = 0;
    for record in csv_reader.records() {
        let record = record.map_err(|e| TournamentError::Csv(e.to_string()))?;
        let Some(name) = record.get(0).filter(|n| !n.is_empty()) else {
            continue;
        };
        let players = record.iter().skip(1).map(str::to_string).collect();
        tournament.add_team(name, players)?;
        added += 1;
    }
    log::info!("Imported {} team(s) into tournament {}", added, tournament.id);
    Ok(added)
}

/// Start the tournament and derive its first matches.
///
/// Non-pool formats need at least 2 teams; the pool format needs a pool
/// partition covering every registered team.
pub fn start_tournament<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.state != TournamentState::Setup {
        return Err(TournamentError::InvalidState);
    }
    if tournament.teams.len() < 2 {
        return Err(TournamentError::NotEnoughTeams { required: 2 });
    }
    if tournament.format == TournamentFormat::Pools {
        if tournament.pools.is_empty() {
            return Err(TournamentError::MissingPools);
        }
        let assigned: HashSet<_> = tournament.pools.iter().flat_map(|p| p.teams.iter()).collect();
        if let Some(missing) = tournament.teams.iter().find(|t| !assigned.contains(&t.id)) {
            return Err(TournamentError::UnassignedTeam(missing.id));
        }
    }
    tournament.state = TournamentState::Running;
    log::info!(
        "Tournament {} started ({:?}, {} teams, {} courts)",
        tournament.id,
        tournament.format,
        tournament.teams.len(),
        tournament.courts
    );
    refresh(tournament, rng);
    Ok(())
}
