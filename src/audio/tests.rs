use super::queue::{apply_move, insert_unplayed, promote, remap_moved, remove_index, shuffled_order};
use super::*;
use crate::error::PlayerError;
use crate::library::Track;
use crate::playlist::Playlist;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// What the fake backend has been told, shared with the test body.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub opened: Vec<PathBuf>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: u8,
    pub drained: bool,
    pub broken: HashSet<PathBuf>,
    pub seeks: Vec<Duration>,
}

/// Scripted [`PlaybackBackend`]: never makes a sound, records every command.
#[derive(Clone, Default)]
pub(crate) struct FakeBackend(pub Rc<RefCell<FakeState>>);

impl FakeBackend {
    pub fn new() -> (Self, Rc<RefCell<FakeState>>) {
        let b = Self::default();
        let state = b.0.clone();
        (b, state)
    }
}

impl PlaybackBackend for FakeBackend {
    fn open(&mut self, path: &Path) -> Result<(), BackendError> {
        let mut s = self.0.borrow_mut();
        if s.broken.contains(path) {
            return Err(BackendError::Other("cannot decode".into()));
        }
        s.opened.push(path.to_path_buf());
        s.playing = false;
        s.position = Duration::ZERO;
        s.drained = false;
        s.duration = Some(Duration::from_secs(180));
        Ok(())
    }

    fn play(&mut self) {
        self.0.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.0.borrow_mut();
        s.playing = false;
        s.position = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        let mut s = self.0.borrow_mut();
        s.position = position;
        s.seeks.push(position);
        Ok(())
    }

    fn position(&self) -> Duration {
        self.0.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        self.0.borrow().duration
    }

    fn set_volume(&mut self, level: u8) {
        self.0.borrow_mut().volume = level;
    }

    fn is_drained(&self) -> bool {
        self.0.borrow().drained
    }
}

pub(crate) fn playlist_of(names: &[&str]) -> Playlist {
    let mut pl = Playlist::default();
    for n in names {
        pl.push(Track::bare(PathBuf::from(format!("/music/{n}"))));
    }
    pl
}

fn controller() -> (PlaybackController, Rc<RefCell<FakeState>>) {
    let (backend, state) = FakeBackend::new();
    let c = PlaybackController::new(Box::new(backend), 70).with_seed(42);
    (c, state)
}

fn last_opened(state: &Rc<RefCell<FakeState>>) -> String {
    let s = state.borrow();
    s.opened
        .last()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[test]
fn play_pause_resume_stop_walk_the_state_machine() {
    let pl = playlist_of(&["a.mp3", "b.mp3"]);
    let (mut c, fake) = controller();
    assert_eq!(c.state(), PlaybackState::Stopped);

    c.play(&pl, 1).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current(), Some(1));
    assert_eq!(last_opened(&fake), "b.mp3");
    assert!(fake.borrow().playing);

    c.pause();
    assert_eq!(c.state(), PlaybackState::Paused);
    assert!(!fake.borrow().playing);

    c.resume();
    assert_eq!(c.state(), PlaybackState::Playing);

    c.stop();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current(), Some(1));
    assert_eq!(c.elapsed(), Duration::ZERO);
}

#[test]
fn play_rejects_out_of_range_index() {
    let pl = playlist_of(&["a.mp3"]);
    let (mut c, _) = controller();
    assert!(matches!(
        c.play(&pl, 3),
        Err(PlayerError::IndexOutOfRange { index: 3, len: 1 })
    ));
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn backend_failure_leaves_player_stopped() {
    let pl = playlist_of(&["a.mp3", "bad.mp3"]);
    let (mut c, fake) = controller();
    fake.borrow_mut()
        .broken
        .insert(PathBuf::from("/music/bad.mp3"));

    c.play(&pl, 0).unwrap();
    let err = c.next(&pl).unwrap_err();
    assert!(matches!(err, PlayerError::Playback { .. }));
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current(), Some(1));
}

#[test]
fn toggle_starts_pauses_and_resumes() {
    let pl = playlist_of(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut c, fake) = controller();

    c.toggle(&pl, 2).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current(), Some(2));

    c.toggle(&pl, 0).unwrap();
    assert_eq!(c.state(), PlaybackState::Paused);
    c.toggle(&pl, 0).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);

    // From Stopped the current track wins over the fallback.
    c.stop();
    c.toggle(&pl, 0).unwrap();
    assert_eq!(c.current(), Some(2));
    assert_eq!(fake.borrow().opened.len(), 2);
}

#[test]
fn toggle_on_empty_playlist_is_a_noop() {
    let pl = Playlist::default();
    let (mut c, _) = controller();
    c.toggle(&pl, 0).unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn next_wraps_to_zero_with_repeat_on() {
    let pl = playlist_of(&["A.mp3", "B.mp3", "C.mp3"]);
    let (mut c, fake) = controller();
    c.set_repeat(true);
    c.play(&pl, 2).unwrap();

    c.next(&pl).unwrap();
    assert_eq!(c.current(), Some(0));
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(last_opened(&fake), "A.mp3");
}

#[test]
fn next_past_the_end_stops_with_repeat_off() {
    let pl = playlist_of(&["A.mp3", "B.mp3", "C.mp3"]);
    let (mut c, _) = controller();
    c.set_repeat(false);
    c.play(&pl, 2).unwrap();

    c.next(&pl).unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn previous_steps_back_and_handles_the_start() {
    let pl = playlist_of(&["A.mp3", "B.mp3", "C.mp3"]);
    let (mut c, _) = controller();

    c.play(&pl, 1).unwrap();
    c.previous(&pl).unwrap();
    assert_eq!(c.current(), Some(0));

    c.previous(&pl).unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);

    c.set_repeat(true);
    c.play(&pl, 0).unwrap();
    c.previous(&pl).unwrap();
    assert_eq!(c.current(), Some(2));
}

#[test]
fn next_without_current_starts_at_the_beginning() {
    let pl = playlist_of(&["A.mp3", "B.mp3"]);
    let (mut c, _) = controller();
    c.next(&pl).unwrap();
    assert_eq!(c.current(), Some(0));
}

#[test]
fn volume_is_clamped_and_forwarded() {
    let (mut c, fake) = controller();
    assert_eq!(fake.borrow().volume, 70);

    assert_eq!(c.set_volume(150), 100);
    assert_eq!(fake.borrow().volume, 100);
    assert_eq!(c.set_volume(-5), 0);
    assert_eq!(fake.borrow().volume, 0);

    c.set_volume(50);
    assert_eq!(c.adjust_volume(60), 100);
    assert_eq!(c.adjust_volume(-30), 70);
}

#[test]
fn tick_tracks_position_and_advances_at_end_of_track() {
    let pl = playlist_of(&["A.mp3", "B.mp3"]);
    let (mut c, fake) = controller();
    c.play(&pl, 0).unwrap();

    fake.borrow_mut().position = Duration::from_secs(12);
    c.tick(&pl).unwrap();
    assert_eq!(c.elapsed(), Duration::from_secs(12));
    assert_eq!(c.current(), Some(0));

    fake.borrow_mut().position = Duration::from_secs(180);
    c.tick(&pl).unwrap();
    assert_eq!(c.current(), Some(1));
    assert_eq!(c.state(), PlaybackState::Playing);

    // Last track drains with looping off: Stopped.
    fake.borrow_mut().drained = true;
    c.tick(&pl).unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn tick_while_paused_does_not_advance() {
    let pl = playlist_of(&["A.mp3", "B.mp3"]);
    let (mut c, fake) = controller();
    c.play(&pl, 0).unwrap();
    c.pause();

    fake.borrow_mut().drained = true;
    c.tick(&pl).unwrap();
    assert_eq!(c.current(), Some(0));
    assert_eq!(c.state(), PlaybackState::Paused);
}

#[test]
fn repeat_one_replays_the_track_at_its_end() {
    let pl = playlist_of(&["A.mp3", "B.mp3"]);
    let (mut c, fake) = controller();
    c.set_loop_mode(LoopMode::LoopOne);
    c.play(&pl, 0).unwrap();

    fake.borrow_mut().drained = true;
    c.tick(&pl).unwrap();
    assert_eq!(c.current(), Some(0));
    assert_eq!(fake.borrow().opened.len(), 2);
    assert_eq!(c.started(), 2);

    // A manual skip still moves on.
    c.next(&pl).unwrap();
    assert_eq!(c.current(), Some(1));
}

#[test]
fn seek_is_clamped_to_track_length() {
    let pl = playlist_of(&["A.mp3"]);
    let (mut c, fake) = controller();

    // Nothing open: ignored.
    c.seek(&pl, Duration::from_secs(5)).unwrap();
    assert!(fake.borrow().seeks.is_empty());

    c.play(&pl, 0).unwrap();
    c.seek(&pl, Duration::from_secs(500)).unwrap();
    assert_eq!(c.elapsed(), Duration::from_secs(180));

    c.seek(&pl, Duration::from_secs(10)).unwrap();
    c.seek_by(&pl, -30).unwrap();
    assert_eq!(c.elapsed(), Duration::ZERO);
    c.seek_by(&pl, 7).unwrap();
    assert_eq!(c.elapsed(), Duration::from_secs(7));
}

#[test]
fn shuffle_plays_every_track_once_per_cycle() {
    let names: Vec<String> = (0..8).map(|i| format!("{i}.mp3")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let pl = playlist_of(&refs);
    let (mut c, _) = controller();
    c.set_shuffle(true, pl.len());
    c.set_repeat(false);

    let mut seen = Vec::new();
    c.next(&pl).unwrap();
    while c.state() == PlaybackState::Playing {
        seen.push(c.current().unwrap());
        c.next(&pl).unwrap();
    }

    let mut sorted = seen.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..8).collect::<Vec<_>>());
}

#[test]
fn shuffle_with_repeat_starts_a_new_cycle_without_immediate_repeat() {
    let pl = playlist_of(&["a", "b", "c", "d"]);
    let (mut c, _) = controller();
    c.set_repeat(true);
    c.set_shuffle(true, pl.len());

    c.next(&pl).unwrap();
    let mut cycle = vec![c.current().unwrap()];
    for _ in 0..3 {
        c.next(&pl).unwrap();
        cycle.push(c.current().unwrap());
    }
    let last = *cycle.last().unwrap();

    c.next(&pl).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_ne!(c.current(), Some(last));
}

#[test]
fn shuffle_previous_walks_back_through_history() {
    let pl = playlist_of(&["a", "b", "c", "d", "e"]);
    let (mut c, _) = controller();
    c.set_shuffle(true, pl.len());

    c.next(&pl).unwrap();
    let first = c.current();
    c.next(&pl).unwrap();
    let second = c.current();
    c.next(&pl).unwrap();

    c.previous(&pl).unwrap();
    assert_eq!(c.current(), second);
    c.previous(&pl).unwrap();
    assert_eq!(c.current(), first);
}

#[test]
fn shuffle_previous_at_cycle_start_with_repeat_replays_without_skipping() {
    let pl = playlist_of(&["a", "b", "c", "d", "e"]);
    let (mut c, _) = controller();
    c.set_repeat(true);
    c.set_shuffle(true, pl.len());

    c.next(&pl).unwrap();
    let first = c.current().unwrap();
    c.previous(&pl).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.current(), Some(first));

    let mut seen = vec![first];
    for _ in 0..4 {
        c.next(&pl).unwrap();
        seen.push(c.current().unwrap());
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[test]
fn shuffle_previous_at_cycle_start_without_repeat_stops() {
    let pl = playlist_of(&["a", "b", "c", "d", "e"]);
    let (mut c, _) = controller();
    c.set_shuffle(true, pl.len());

    c.next(&pl).unwrap();
    let first = c.current().unwrap();
    c.previous(&pl).unwrap();
    assert_eq!(c.state(), PlaybackState::Stopped);
    assert_eq!(c.current(), Some(first));

    let mut seen = vec![first];
    c.next(&pl).unwrap();
    while c.state() == PlaybackState::Playing {
        seen.push(c.current().unwrap());
        c.next(&pl).unwrap();
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[test]
fn explicitly_played_track_counts_as_played_in_shuffle() {
    let pl = playlist_of(&["a", "b", "c"]);
    let (mut c, _) = controller();
    c.set_shuffle(true, pl.len());
    c.play(&pl, 1).unwrap();

    let mut rest = Vec::new();
    c.next(&pl).unwrap();
    while c.state() == PlaybackState::Playing {
        rest.push(c.current().unwrap());
        c.next(&pl).unwrap();
    }
    rest.sort_unstable();
    assert_eq!(rest, vec![0, 2]);
}

#[test]
fn playlist_edits_keep_current_index_pointing_at_the_same_track() {
    let (mut c, _) = controller();
    let pl = playlist_of(&["a", "b", "c", "d"]);
    c.play(&pl, 2).unwrap();

    c.track_moved(2, 0);
    assert_eq!(c.current(), Some(0));
    c.track_moved(3, 0);
    assert_eq!(c.current(), Some(1));

    c.track_removed(0);
    assert_eq!(c.current(), Some(0));
    assert_eq!(c.state(), PlaybackState::Playing);

    c.track_removed(0);
    assert_eq!(c.current(), None);
    assert_eq!(c.state(), PlaybackState::Stopped);
}

#[test]
fn shuffle_cycle_survives_removal_and_append() {
    let mut pl = playlist_of(&["a", "b", "c", "d"]);
    let (mut c, _) = controller();
    c.set_shuffle(true, pl.len());
    c.next(&pl).unwrap();

    let victim = (0..pl.len()).find(|&i| Some(i) != c.current()).unwrap();
    pl.remove(victim).unwrap();
    c.track_removed(victim);

    let old = pl.len();
    pl.push(Track::bare(PathBuf::from("/music/e")));
    pl.push(Track::bare(PathBuf::from("/music/f")));
    c.tracks_appended(old, pl.len());

    let mut seen = vec![c.current().unwrap()];
    c.next(&pl).unwrap();
    while c.state() == PlaybackState::Playing {
        seen.push(c.current().unwrap());
        c.next(&pl).unwrap();
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..pl.len()).collect::<Vec<_>>());
}

#[test]
fn loop_mode_cycles_three_states() {
    let (mut c, _) = controller();
    assert_eq!(c.loop_mode(), LoopMode::NoLoop);
    c.cycle_loop_mode();
    assert_eq!(c.loop_mode(), LoopMode::LoopAll);
    assert!(c.repeat());
    c.cycle_loop_mode();
    assert_eq!(c.loop_mode(), LoopMode::LoopOne);
    assert!(c.repeat());
    c.cycle_loop_mode();
    assert_eq!(c.loop_mode(), LoopMode::NoLoop);
}

#[test]
fn shuffled_order_is_a_permutation_with_pinned_first() {
    let mut rng = StdRng::seed_from_u64(1);
    let order = shuffled_order(6, Some(4), &mut rng);
    assert_eq!(order[0], 4);
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn promote_moves_unplayed_after_pos_and_played_to_pos() {
    let mut order = vec![3, 1, 0, 2];
    assert_eq!(promote(&mut order, Some(0), 2), Some(1));
    assert_eq!(order, vec![3, 2, 1, 0]);

    assert_eq!(promote(&mut order, Some(1), 3), Some(1));
    assert_eq!(order, vec![2, 3, 1, 0]);

    assert_eq!(promote(&mut order, None, 0), Some(0));
    assert_eq!(order, vec![0, 2, 3, 1]);
    assert_eq!(promote(&mut order, None, 9), None);
}

#[test]
fn remove_index_shifts_and_keeps_pos_on_the_played_prefix() {
    let mut order = vec![3, 1, 0, 2];
    let mut pos = Some(1);
    remove_index(&mut order, &mut pos, 3);
    assert_eq!(order, vec![1, 0, 2]);
    assert_eq!(pos, Some(0));

    remove_index(&mut order, &mut pos, 2);
    assert_eq!(order, vec![1, 0]);
    assert_eq!(pos, Some(0));

    remove_index(&mut order, &mut pos, 1);
    assert_eq!(order, vec![0]);
    assert_eq!(pos, None);
}

#[test]
fn moves_remap_indices() {
    assert_eq!(remap_moved(0, 0, 2), 2);
    assert_eq!(remap_moved(1, 0, 2), 0);
    assert_eq!(remap_moved(2, 0, 2), 1);
    assert_eq!(remap_moved(3, 0, 2), 3);
    assert_eq!(remap_moved(0, 2, 0), 1);
    assert_eq!(remap_moved(2, 2, 0), 0);

    let mut order = vec![2, 0, 1];
    apply_move(&mut order, 0, 2);
    assert_eq!(order, vec![1, 2, 0]);
}

#[test]
fn insert_unplayed_never_touches_the_played_prefix() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut order = vec![2, 0, 1];
    insert_unplayed(&mut order, Some(1), 3..6, &mut rng);
    assert_eq!(&order[..2], &[2, 0]);
    let mut tail = order[2..].to_vec();
    tail.sort_unstable();
    assert_eq!(tail, vec![1, 3, 4, 5]);
}
