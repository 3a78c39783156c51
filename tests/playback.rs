use std::thread;
use std::time::{Duration, Instant};

use rtttl_tone::{
    parse_song, ManualTimer, PlayOptions, PlaybackMode, PlaybackState, RtttlPlayer, Sequencer,
    SystemTimer, TickThread, TimerSource, ToneActuator, ToneEvent, ToneLog,
};

const SCALE: &str = "scale:d=8,o=5,b=120:c,d,e,f,g,a,b,c6";

/// Same notes as `SCALE`, 100 ms each
const SLOW_SCALE: &str = "slow:d=4,o=5,b=600:c,d,e,f,g,a,b,c6";
const SCALE_HZ: [u32; 8] = [523, 587, 659, 698, 784, 880, 988, 1047];

/// Records calls like `ToneLog`, but a blocking play lasts as long as the note
#[derive(Default)]
struct BlockingLog {
    log: ToneLog,
}

impl ToneActuator for BlockingLog {
    fn play(&mut self, frequency_hz: u32, volume: u8, duration_ms: u32, background: bool) {
        self.log.play(frequency_hz, volume, duration_ms, background);
        if !background {
            thread::sleep(Duration::from_millis(u64::from(duration_ms)));
        }
    }

    fn silence(&mut self) {
        self.log.silence();
    }
}

fn blocking_plays(log: &ToneLog) -> Vec<u32> {
    log.events()
        .iter()
        .filter_map(|e| match *e {
            ToneEvent::Play {
                frequency_hz,
                background: false,
                ..
            } => Some(frequency_hz),
            _ => None,
        })
        .collect()
}

fn background() -> PlayOptions {
    PlayOptions {
        background: true,
        ..PlayOptions::default()
    }
}

fn audible(log: &ToneLog) -> Vec<u32> {
    log.events()
        .iter()
        .filter_map(|e| match *e {
            ToneEvent::Play { frequency_hz, .. } => Some(frequency_hz),
            ToneEvent::Silence => None,
        })
        .collect()
}

#[test]
fn advance_k_times_reaches_song_length() {
    let song = parse_song(SCALE, 0).unwrap();
    let len = song.len();
    for k in 0..=len + 3 {
        let mut seq = Sequencer::new(ToneLog::new(), ManualTimer::new());
        seq.start(song.clone(), 10, true);
        for _ in 0..k {
            seq.advance();
        }
        assert_eq!(seq.current_index(), k.min(len));
        assert_eq!(seq.is_playing(), k < len, "after {} advances", k);
    }
}

#[test]
fn pause_then_resume_restarts_current_note() {
    let player = RtttlPlayer::new(ToneLog::new(), ManualTimer::new());
    let ticker = player.ticker();
    player.parse_and_play(SCALE, background()).unwrap();

    player.sequencer().timer_mut().advance_by(250);
    ticker.tick();
    player.sequencer().timer_mut().advance_by(100);
    let index = player.sequencer().current_index();

    player.pause_resume();
    assert_eq!(player.state(), PlaybackState::Paused);
    player.pause_resume();
    assert_eq!(player.state(), PlaybackState::Playing);

    let seq = player.sequencer();
    assert_eq!(seq.current_index(), index);
    // The whole note is scheduled again from the resume time
    assert_eq!(seq.note_end_ms(), seq.timer().now_ms() + 250);
    assert_eq!(audible(seq.actuator()), vec![523, 587, 587]);
}

#[test]
fn stop_is_idempotent() {
    let player = RtttlPlayer::new(ToneLog::new(), ManualTimer::new());
    player.parse_and_play(SCALE, background()).unwrap();
    for _ in 0..3 {
        player.stop();
        assert!(!player.is_playing());
        let seq = player.sequencer();
        assert!(seq.song().is_empty());
        assert!(seq.song().notes().iter().all(|n| n.frequency == 0));
        assert_eq!(seq.current_index(), 0);
        assert!(!seq.timer().is_armed());
    }
}

#[test]
fn zero_volume_never_sounds() {
    let player = RtttlPlayer::new(ToneLog::new(), ManualTimer::new());
    player.set_volume(0);
    player.parse_and_play(SCALE, background()).unwrap();
    assert_eq!(player.state(), PlaybackState::Idle);
    player.parse_and_play(SCALE, PlayOptions::default()).unwrap();
    assert_eq!(player.sequencer().actuator().audible_count(), 0);
}

#[test]
fn foreground_play_sounds_every_note_in_order() {
    let player = RtttlPlayer::new(ToneLog::new(), ManualTimer::new());
    player.parse_and_play(SCALE, PlayOptions::default()).unwrap();
    let seq = player.sequencer();
    assert_eq!(
        audible(seq.actuator()),
        vec![523, 587, 659, 698, 784, 880, 988, 1047]
    );
    assert!(seq.actuator().events().iter().all(|e| !matches!(
        e,
        ToneEvent::Play {
            background: true,
            ..
        }
    )));
    assert_eq!(seq.timer().arm_count(), 0);
}

#[test]
fn tick_thread_plays_background_song() {
    let timer = SystemTimer::new();
    let armed = timer.armed_flag();
    let player = RtttlPlayer::new(ToneLog::new(), timer);
    let _ticks = TickThread::spawn(player.ticker(), armed, Duration::from_millis(1));

    // 3 notes of 10 ms each at 1500 bpm
    player
        .parse_and_play("fast:d=16,o=5,b=1500:c,d,e", background())
        .unwrap();
    assert!(player.is_playing());

    let deadline = Instant::now() + Duration::from_secs(5);
    while player.is_playing() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(!player.is_playing());
    assert_eq!(audible(player.sequencer().actuator()), vec![523, 587, 659]);
}

#[test]
fn new_song_replaces_background_song() {
    let player = RtttlPlayer::new(ToneLog::new(), ManualTimer::new());
    player.parse_and_play(SCALE, background()).unwrap();
    player
        .parse_and_play("other:d=4,o=6,b=120:a", background())
        .unwrap();
    assert_eq!(player.current_song_name().trim_end(), "other");
    assert_eq!(player.sequencer().current_index(), 0);
    assert_eq!(player.sequencer().song().len(), 1);
}

#[test]
fn stop_from_another_thread_ends_blocking_song() {
    let player = RtttlPlayer::new(BlockingLog::default(), ManualTimer::new());
    let remote = player.clone();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        remote.stop();
    });

    let started = Instant::now();
    player.parse_and_play(SLOW_SCALE, PlayOptions::default()).unwrap();
    let elapsed = started.elapsed();
    stopper.join().unwrap();

    assert_eq!(player.state(), PlaybackState::Idle);
    assert!(player.sequencer().song().is_empty());
    let played = blocking_plays(&player.sequencer().actuator().log);
    // Stopped at the end of the note sounding at 150 ms
    assert!((1..=3).contains(&played.len()), "played {:?}", played);
    assert_eq!(played[..], SCALE_HZ[..played.len()]);
    assert!(elapsed < Duration::from_millis(800));
}

#[test]
fn pause_and_resume_from_another_thread() {
    let player = RtttlPlayer::new(BlockingLog::default(), ManualTimer::new());
    let remote = player.clone();
    let controller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        remote.pause_resume();
        thread::sleep(Duration::from_millis(300));
        let paused = remote.state();
        let index = remote.sequencer().current_index();
        remote.pause_resume();
        (paused, index)
    });

    player.parse_and_play(SLOW_SCALE, PlayOptions::default()).unwrap();
    let (paused, index) = controller.join().unwrap();

    assert_eq!(paused, PlaybackState::Paused);
    assert!((1..=3).contains(&index), "paused at note {}", index);
    assert_eq!(player.state(), PlaybackState::Idle);
    let seq = player.sequencer();
    assert_eq!(blocking_plays(&seq.actuator().log), SCALE_HZ.to_vec());
    assert_eq!(seq.current_index(), SCALE_HZ.len());
}

#[test]
fn background_song_replaces_blocking_song() {
    let player = RtttlPlayer::new(BlockingLog::default(), ManualTimer::new());
    let remote = player.clone();
    let replacer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        remote
            .parse_and_play("other:d=4,o=6,b=120:a", background())
            .unwrap();
    });

    // Returns once the blocking loop sees it was replaced
    player.parse_and_play(SLOW_SCALE, PlayOptions::default()).unwrap();
    replacer.join().unwrap();

    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.current_song_name().trim_end(), "other");
    let seq = player.sequencer();
    assert_eq!(seq.mode(), PlaybackMode::Background);
    assert_eq!(seq.current_index(), 0);
    let played = blocking_plays(&seq.actuator().log);
    assert!((1..=3).contains(&played.len()), "played {:?}", played);
    assert_eq!(played[..], SCALE_HZ[..played.len()]);
    assert_eq!(
        seq.actuator().log.last_play(),
        Some(ToneEvent::Play {
            frequency_hz: 1760,
            volume: 10,
            duration_ms: 500,
            background: true,
        })
    );
}
