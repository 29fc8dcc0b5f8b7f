use std::fmt;

/// Opaque identifier of a competitor. Stable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl PlayerId {
    /// Get the raw index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Ordered list of the players taking part in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRoster {
    players: Vec<PlayerId>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        PlayerRoster {
            players: Vec::new(),
        }
    }

    /// Roster with ids `0..count` in order
    pub fn with_players(count: usize) -> Self {
        PlayerRoster {
            players: (0..count).map(PlayerId).collect(),
        }
    }

    /// Add a player. Returns false if the id is already present.
    pub fn add(&mut self, id: PlayerId) -> bool {
        if self.players.contains(&id) {
            return false;
        }
        self.players.push(id);
        true
    }

    /// Remove the player at `index`, or `None` if there is no such entry
    pub fn remove(&mut self, index: usize) -> Option<PlayerId> {
        if index < self.players.len() {
            Some(self.players.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<PlayerId> {
        self.players.get(index).copied()
    }

    /// Position of `id` in turn order
    pub fn find(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|&p| p == id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().copied()
    }
}

impl FromIterator<PlayerId> for PlayerRoster {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        let mut roster = PlayerRoster::new();
        for id in iter {
            roster.add(id);
        }
        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_players() {
        let roster = PlayerRoster::with_players(2);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(0), Some(PlayerId(0)));
        assert_eq!(roster.get(1), Some(PlayerId(1)));
        assert_eq!(roster.get(2), None);
    }

    #[test]
    fn test_add_ignores_duplicates() {
        let mut roster = PlayerRoster::new();
        assert!(roster.add(PlayerId(3)));
        assert!(!roster.add(PlayerId(3)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let mut roster = PlayerRoster::with_players(2);
        assert_eq!(roster.remove(5), None);
        assert_eq!(roster.remove(0), Some(PlayerId(0)));
        assert_eq!(roster.get(0), Some(PlayerId(1)));
    }

    #[test]
    fn test_find() {
        let roster: PlayerRoster = [PlayerId(7), PlayerId(2)].into_iter().collect();
        assert_eq!(roster.find(PlayerId(2)), Some(1));
        assert_eq!(roster.find(PlayerId(0)), None);
    }

    #[test]
    fn test_player_display() {
        assert_eq!(PlayerId(1).to_string(), "Player 1");
    }
}
