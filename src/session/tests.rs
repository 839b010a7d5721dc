use super::*;
use crate::audio::tests::{FakeBackend, FakeState, playlist_of};
use crate::config::{EqualizerSettings, LibrarySettings};
use crate::library::tests::write_wav;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

fn session_with(playlist: Playlist, autoplay: bool) -> (Session, Rc<RefCell<FakeState>>) {
    let (backend, state) = FakeBackend::new();
    let session = Session::with_parts(
        playlist,
        PlaybackController::new(Box::new(backend), 70),
        EqualizerSampler::new(&EqualizerSettings::default()),
        autoplay,
    );
    (session, state)
}

fn empty_session(autoplay: bool) -> (Session, Rc<RefCell<FakeState>>) {
    session_with(Playlist::new(LibrarySettings::default()), autoplay)
}

/// A temp dir holding `names` as short WAV files.
fn music_dir(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = names
        .iter()
        .map(|n| {
            let p = dir.path().join(n);
            write_wav(&p, 0.2);
            p
        })
        .collect();
    (dir, paths)
}

fn titles(s: &Session) -> Vec<String> {
    s.playlist().tracks().iter().map(|t| t.title.clone()).collect()
}

#[test]
fn add_paths_scans_folders_skips_duplicates_and_reports_failures() {
    let (dir, paths) = music_dir(&["a.wav", "b.wav"]);
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "hello").unwrap();
    let (mut s, fake) = empty_session(false);

    let report = s.add_paths(&[dir.path().to_path_buf(), paths[0].clone(), notes]);
    assert_eq!(report.added, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(report.errors[0], PlayerError::UnreadableFile { .. }));
    assert_eq!(titles(&s), vec!["a", "b"]);

    assert_eq!(s.state(), PlaybackState::Stopped);
    assert!(fake.borrow().opened.is_empty());
    assert!(report.summary().contains("added 2 track(s)"));
}

#[test]
fn add_paths_autoplays_the_first_new_track() {
    let (_dir, paths) = music_dir(&["a.wav", "b.wav"]);
    let (mut s, fake) = empty_session(true);

    s.add_paths(&paths[1..]);
    assert_eq!(s.current(), Some(0));
    assert_eq!(s.state(), PlaybackState::Playing);

    // Something is already current: adding more does not interrupt it.
    s.add_paths(&paths[..1]);
    assert_eq!(s.current(), Some(0));
    assert_eq!(fake.borrow().opened.len(), 1);
}

#[test]
fn add_paths_imports_m3u_without_duplicates() {
    let (dir, paths) = music_dir(&["a.wav", "b.wav"]);
    let list = dir.path().join("mix.m3u");
    fs::write(&list, "#EXTM3U\n#EXTINF:1,First\na.wav\nb.wav\n").unwrap();
    let (mut s, _) = empty_session(false);

    s.add_paths(&paths[..1]);
    let report = s.add_paths(&[list]);
    assert_eq!(report.added, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(s.playlist().len(), 2);
}

#[test]
fn add_path_rejects_unreadable_files() {
    let (mut s, _) = empty_session(false);
    let err = s.add_path(Path::new("/definitely/not/here.mp3")).unwrap_err();
    assert!(matches!(err, PlayerError::UnreadableFile { .. }));
    assert!(s.playlist().is_empty());
}

#[test]
fn next_from_last_track_wraps_with_loop_all() {
    let (mut s, _) = session_with(playlist_of(&["A", "B", "C"]), false);
    s.set_loop_mode(LoopMode::LoopAll);
    s.play(2).unwrap();
    s.next().unwrap();
    assert_eq!(s.current(), Some(0));

    s.set_loop_mode(LoopMode::NoLoop);
    s.play(2).unwrap();
    s.next().unwrap();
    assert_eq!(s.state(), PlaybackState::Stopped);
}

#[test]
fn removing_the_playing_track_plays_its_successor() {
    let (mut s, fake) = session_with(playlist_of(&["a", "b", "c"]), false);
    s.play(1).unwrap();

    let removed = s.remove(1).unwrap();
    assert_eq!(removed.title, "b");
    assert_eq!(s.current(), Some(1));
    assert_eq!(s.current_track().unwrap().title, "c");
    assert_eq!(s.state(), PlaybackState::Playing);
    assert_eq!(fake.borrow().opened.last().unwrap(), Path::new("/music/c"));

    // Last slot, no looping: nothing slides in, playback stops.
    s.remove(1).unwrap();
    assert_eq!(s.state(), PlaybackState::Stopped);
    assert_eq!(s.current(), None);
}

#[test]
fn removing_other_tracks_keeps_playback_on_the_same_track() {
    let (mut s, _) = session_with(playlist_of(&["a", "b", "c"]), false);
    s.play(2).unwrap();
    s.remove(0).unwrap();
    assert_eq!(s.current(), Some(1));
    assert_eq!(s.current_track().unwrap().title, "c");
    assert!(matches!(
        s.remove(7),
        Err(PlayerError::IndexOutOfRange { index: 7, len: 2 })
    ));
}

#[test]
fn reorder_follows_the_playing_track() {
    let (mut s, _) = session_with(playlist_of(&["a", "b", "c"]), false);
    s.play(0).unwrap();
    s.reorder(0, 2).unwrap();
    assert_eq!(titles(&s), vec!["b", "c", "a"]);
    assert_eq!(s.current(), Some(2));
    assert!(s.reorder(0, 3).is_err());
}

#[test]
fn clear_stops_and_empties() {
    let (mut s, _) = session_with(playlist_of(&["a", "b"]), false);
    s.play(0).unwrap();
    s.clear();
    assert!(s.playlist().is_empty());
    assert_eq!(s.state(), PlaybackState::Stopped);
    assert_eq!(s.current(), None);
    s.toggle_play_pause(0).unwrap();
    assert_eq!(s.state(), PlaybackState::Stopped);
}

#[test]
fn export_then_load_replaces_the_playlist() {
    let (dir, paths) = music_dir(&["a.wav", "b.wav", "c.wav"]);
    let list = dir.path().join("lists/saved.m3u");
    let (mut s, _) = empty_session(false);
    s.add_paths(&paths[..2]);
    s.export_playlist(&list).unwrap();

    s.clear();
    s.add_paths(&paths[2..]);
    s.play(0).unwrap();

    assert_eq!(s.load_playlist(&list).unwrap(), 2);
    assert_eq!(titles(&s), vec!["a", "b"]);
    assert_eq!(s.state(), PlaybackState::Stopped);

    assert_eq!(s.import_playlist(&list).unwrap(), 2);
    assert_eq!(s.playlist().len(), 4);
}

#[test]
fn failed_load_keeps_the_current_playlist() {
    let (mut s, _) = session_with(playlist_of(&["a", "b"]), false);
    s.play(1).unwrap();
    let err = s.load_playlist(Path::new("/nowhere/list.m3u")).unwrap_err();
    assert!(matches!(err, PlayerError::Parse { .. }));
    assert_eq!(s.playlist().len(), 2);
    assert_eq!(s.state(), PlaybackState::Playing);
}

#[test]
fn tick_feeds_the_equalizer_from_the_playing_track() {
    let (_dir, paths) = music_dir(&["tone.wav"]);
    let (mut s, fake) = empty_session(true);
    s.add_paths(&paths);
    assert!(s.snapshot().is_silent());

    fake.borrow_mut().position = Duration::from_millis(100);
    s.tick().unwrap();
    assert_eq!(s.snapshot().levels.len(), 20);
    assert!(!s.snapshot().is_silent());
    assert_eq!(s.elapsed(), Duration::from_millis(100));

    s.toggle_play_pause(0).unwrap();
    s.tick().unwrap();
    assert_eq!(s.state(), PlaybackState::Paused);
    assert!(s.snapshot().is_silent());
}

#[test]
fn tick_auto_advances_and_stops_at_the_end() {
    let (mut s, fake) = session_with(playlist_of(&["a", "b"]), false);
    s.play(0).unwrap();

    fake.borrow_mut().drained = true;
    s.tick().unwrap();
    assert_eq!(s.current(), Some(1));

    fake.borrow_mut().drained = true;
    s.tick().unwrap();
    assert_eq!(s.state(), PlaybackState::Stopped);
    assert!(s.snapshot().is_silent());
}

#[test]
fn volume_and_modes_pass_through() {
    let (mut s, fake) = session_with(playlist_of(&["a", "b"]), false);
    assert_eq!(s.set_volume(150), 100);
    assert_eq!(s.adjust_volume(-105), 0);
    assert_eq!(fake.borrow().volume, 0);

    assert!(s.toggle_shuffle());
    assert!(!s.toggle_shuffle());
    assert_eq!(s.cycle_loop_mode(), LoopMode::LoopAll);
}
