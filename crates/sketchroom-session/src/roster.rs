//! The ordered set of players in one room.
//!
//! Join order is stable: it decides drawer rotation, host promotion and
//! scoreboard tie-breaks. The roster itself is a plain `Vec` owned by the
//! room's event loop; it does no locking.

use std::collections::HashSet;

use sketchroom_protocol::{ConnectionId, PlayerId, PlayerView, ScoreEntry};
use sketchroom_timer::TimerHandle;
use tracing::{debug, info};

use crate::{Player, Reconnect, SessionError};

/// Colors handed to players in join order.
pub const PALETTE: [&str; 8] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#FFA500", "#800080",
];

/// Color used once every palette entry is taken.
pub const FALLBACK_COLOR: &str = "#FFFFFF";

/// Result of [`Roster::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A new player was appended.
    Joined,
    /// An existing player got a new socket.
    Reconnected(Reconnect),
}

/// A player taken out of the roster.
#[derive(Debug, Clone)]
pub struct Removal {
    pub player: Player,
    /// Grace timer that no longer needs to fire.
    pub pending_removal: Option<TimerHandle>,
    /// Set when the removed player was host and someone else took over.
    pub new_host: Option<PlayerId>,
}

#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
    max_players: usize,
    banned: HashSet<PlayerId>,
}

impl Roster {
    pub fn new(max_players: usize) -> Self {
        Self {
            players: Vec::new(),
            max_players,
            banned: HashSet::new(),
        }
    }

    /// Adds a player, or reattaches a known one.
    ///
    /// The first player ever added becomes host. Reconnecting players keep
    /// their score, color and flags, and never count against capacity.
    pub fn join(
        &mut self,
        id: PlayerId,
        name: String,
        connection: ConnectionId,
    ) -> Result<JoinOutcome, SessionError> {
        if self.banned.contains(&id) {
            return Err(SessionError::Banned(id));
        }

        if let Some(player) = self.get_mut(&id) {
            let reconnect = player.connect(connection)?;
            debug!(player_id = %id, ?reconnect, "player reattached");
            return Ok(JoinOutcome::Reconnected(reconnect));
        }

        if self.players.len() >= self.max_players {
            return Err(SessionError::CapacityExceeded {
                max: self.max_players,
            });
        }

        let color = self.next_color();
        let mut player = Player::new(id, name, color, connection);
        player.is_host = self.host().is_none();
        info!(player_id = %player.id, color = %player.color, host = player.is_host, "player added to roster");
        self.players.push(player);
        Ok(JoinOutcome::Joined)
    }

    /// Starts `id`'s grace period if `connection` is its live socket.
    ///
    /// Returns `Ok(false)` for a superseded socket.
    pub fn disconnect(
        &mut self,
        id: &PlayerId,
        connection: ConnectionId,
    ) -> Result<bool, SessionError> {
        let player = self
            .get_mut(id)
            .ok_or_else(|| SessionError::PlayerNotFound(id.clone()))?;
        Ok(player.disconnect(connection))
    }

    /// Takes `id` out of the roster, promoting a new host if needed.
    pub fn remove(&mut self, id: &PlayerId) -> Result<Removal, SessionError> {
        let index = self
            .position(id)
            .ok_or_else(|| SessionError::PlayerNotFound(id.clone()))?;
        let mut player = self.players.remove(index);
        let was_host = player.is_host;
        let pending_removal = player.mark_removed();

        let new_host = if was_host {
            self.players.first_mut().map(|next| {
                next.is_host = true;
                next.id.clone()
            })
        } else {
            None
        };

        info!(player_id = %player.id, ?new_host, remaining = self.players.len(), "player removed from roster");
        Ok(Removal {
            player,
            pending_removal,
            new_host,
        })
    }

    /// Prevents `id` from joining again.
    pub fn ban(&mut self, id: PlayerId) {
        self.banned.insert(id);
    }

    pub fn is_banned(&self, id: &PlayerId) -> bool {
        self.banned.contains(id)
    }

    // -- Lookup -------------------------------------------------------------

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// Players in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn connected(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_connected())
    }

    pub fn connected_count(&self) -> usize {
        self.connected().count()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.get(id).is_some_and(|p| p.is_host)
    }

    pub fn drawer(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_drawing)
    }

    // -- Round bookkeeping --------------------------------------------------

    /// Makes `id` the only drawing player, or clears the role for `None`.
    pub fn set_drawer(&mut self, id: Option<&PlayerId>) {
        for player in &mut self.players {
            player.is_drawing = Some(&player.id) == id;
        }
    }

    pub fn reset_guesses(&mut self) {
        for player in &mut self.players {
            player.reset_guess();
        }
    }

    // -- Views --------------------------------------------------------------

    pub fn views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    /// Scores in join order.
    pub fn scores(&self) -> Vec<ScoreEntry> {
        self.players.iter().map(score_entry).collect()
    }

    /// Scores from highest to lowest; equal scores keep join order.
    pub fn ranking(&self) -> Vec<ScoreEntry> {
        let mut entries = self.scores();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }

    fn next_color(&self) -> String {
        PALETTE
            .iter()
            .find(|c| !self.players.iter().any(|p| p.color == **c))
            .unwrap_or(&FALLBACK_COLOR)
            .to_string()
    }
}

fn score_entry(player: &Player) -> ScoreEntry {
    ScoreEntry {
        player_id: player.id.clone(),
        name: player.name.clone(),
        score: player.score(),
    }
}
