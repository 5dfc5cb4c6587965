use super::Track;

pub const DEFAULT_VOLUME: f32 = 0.7;

/// Player state for one listening session
///
/// Owned by whoever drives the UI; nothing here is shared between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    current_track: Option<Track>,
    is_playing: bool,
    volume: f32,
    /// Seconds into the current track
    position: f64,
    playlist: Vec<Track>,
    current_index: usize,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            volume: DEFAULT_VOLUME,
            position: 0.0,
            playlist: Vec::new(),
            current_index: 0,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Starts playing `track`, appending it to the playlist if it is not there yet
    pub fn play(&mut self, track: Track) {
        match self.playlist.iter().position(|t| t.id == track.id) {
            Some(index) => self.current_index = index,
            None => {
                self.playlist.push(track.clone());
                self.current_index = self.playlist.len() - 1;
            }
        }
        self.current_track = Some(track);
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn resume(&mut self) {
        self.is_playing = true;
    }

    pub fn stop(&mut self) {
        self.is_playing = false;
        self.position = 0.0;
    }

    /// Moves to the next playlist entry; stays put at the end
    pub fn next(&mut self) {
        if self.current_index + 1 < self.playlist.len() {
            self.current_index += 1;
            self.current_track = self.playlist.get(self.current_index).cloned();
        }
    }

    /// Moves to the previous playlist entry; stays put at the start
    pub fn previous(&mut self) {
        if self.current_index > 0 && !self.playlist.is_empty() {
            self.current_index -= 1;
            self.current_track = self.playlist.get(self.current_index).cloned();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_nan() {
            DEFAULT_VOLUME
        } else {
            volume.clamp(0.0, 1.0)
        };
    }

    /// Seeks within the current track; a zero duration means unknown and only the start is bounded
    pub fn set_position(&mut self, seconds: f64) {
        let seconds = seconds.max(0.0);
        self.position = match self.current_track.as_ref().map(|t| t.duration) {
            Some(duration) if duration > 0 => seconds.min(duration as f64),
            _ => seconds,
        };
    }

    /// Replaces the playlist and rewinds to its first entry
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        self.playlist = tracks;
        self.current_index = 0;
        if let Some(first) = self.playlist.first() {
            self.current_track = Some(first.clone());
        }
    }

    pub fn add_to_playlist(&mut self, track: Track) {
        self.playlist.push(track);
    }

    /// Removes the entry at `index`; out-of-range indices are ignored
    pub fn remove_from_playlist(&mut self, index: usize) {
        if index >= self.playlist.len() {
            return;
        }
        let removed_current = index == self.current_index;
        self.playlist.remove(index);

        if index < self.current_index {
            self.current_index -= 1;
        } else if self.current_index >= self.playlist.len() {
            self.current_index = self.playlist.len().saturating_sub(1);
        }

        if removed_current {
            self.current_track = self.playlist.get(self.current_index).cloned();
            if self.current_track.is_none() {
                self.is_playing = false;
                self.position = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Title {}", id),
            artist: "Artist".to_string(),
            duration: 0,
            youtube_id: id.to_string(),
            thumbnail: String::new(),
            genre: vec![],
            mood: vec![],
            popularity: 0,
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let session = PlaybackSession::new();
        assert!(session.current_track().is_none());
        assert!(!session.is_playing());
        assert_eq!(session.volume(), DEFAULT_VOLUME);
        assert!(session.playlist().is_empty());
    }

    #[test]
    fn test_play_appends_new_track() {
        let mut session = PlaybackSession::new();
        session.play(track("a"));
        session.play(track("b"));

        assert_eq!(session.playlist().len(), 2);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.current_track().unwrap().id, "b");
        assert!(session.is_playing());
    }

    #[test]
    fn test_play_existing_track_jumps_to_it() {
        let mut session = PlaybackSession::new();
        session.set_playlist(vec![track("a"), track("b"), track("c")]);
        session.play(track("b"));

        assert_eq!(session.playlist().len(), 3);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_next_and_previous_are_bounded() {
        let mut session = PlaybackSession::new();
        session.set_playlist(vec![track("a"), track("b")]);
        session.play(track("a"));

        session.previous();
        assert_eq!(session.current_index(), 0);

        session.next();
        assert_eq!(session.current_track().unwrap().id, "b");

        session.next();
        assert_eq!(session.current_index(), 1);

        session.previous();
        assert_eq!(session.current_track().unwrap().id, "a");
    }

    #[test]
    fn test_pause_resume_stop() {
        let mut session = PlaybackSession::new();
        session.play(track("a"));
        session.set_position(42.5);

        session.pause();
        assert!(!session.is_playing());
        assert_eq!(session.position(), 42.5);

        session.resume();
        assert!(session.is_playing());

        session.stop();
        assert!(!session.is_playing());
        assert_eq!(session.position(), 0.0);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut session = PlaybackSession::new();
        session.set_volume(1.5);
        assert_eq!(session.volume(), 1.0);
        session.set_volume(-0.2);
        assert_eq!(session.volume(), 0.0);
        session.set_volume(0.3);
        assert_eq!(session.volume(), 0.3);
    }

    #[test]
    fn test_remove_before_current_shifts_index() {
        let mut session = PlaybackSession::new();
        session.set_playlist(vec![track("a"), track("b"), track("c")]);
        session.play(track("c"));

        session.remove_from_playlist(0);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.playlist()[session.current_index()].id, "c");

        session.remove_from_playlist(10);
        assert_eq!(session.playlist().len(), 2);
    }

    #[test]
    fn test_set_playlist_moves_to_first_entry() {
        let mut session = PlaybackSession::new();
        session.play(track("old"));
        session.set_playlist(vec![track("a"), track("b")]);

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_track().unwrap().id, "a");

        session.next();
        assert_eq!(session.current_track().unwrap().id, "b");
    }

    #[test]
    fn test_set_empty_playlist_keeps_current_track() {
        let mut session = PlaybackSession::new();
        session.play(track("a"));
        session.set_playlist(vec![]);

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_track().unwrap().id, "a");
    }

    #[test]
    fn test_remove_current_entry_follows_playlist() {
        let mut session = PlaybackSession::new();
        session.set_playlist(vec![track("a"), track("b")]);
        session.play(track("a"));

        session.remove_from_playlist(0);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_track().unwrap().id, "b");
        assert_eq!(session.playlist()[0].id, "b");
    }

    #[test]
    fn test_remove_only_entry_clears_current_track() {
        let mut session = PlaybackSession::new();
        session.play(track("a"));

        session.remove_from_playlist(0);
        assert!(session.playlist().is_empty());
        assert!(session.current_track().is_none());
        assert!(!session.is_playing());
    }

    #[test]
    fn test_position_clamped_to_known_duration() {
        let mut session = PlaybackSession::new();
        session.set_position(-3.0);
        assert_eq!(session.position(), 0.0);

        session.play(track("a"));
        session.set_position(500.0);
        assert_eq!(session.position(), 500.0);

        let mut long = track("b");
        long.duration = 210;
        session.play(long);
        session.set_position(500.0);
        assert_eq!(session.position(), 210.0);
        session.set_position(30.0);
        assert_eq!(session.position(), 30.0);
    }

    #[test]
    fn test_remove_last_entry_keeps_index_in_range() {
        let mut session = PlaybackSession::new();
        session.set_playlist(vec![track("a"), track("b")]);
        session.play(track("b"));

        session.remove_from_playlist(1);
        assert_eq!(session.current_index(), 0);
    }
}
