//! Procedural feedback sounds.
//!
//! Every cue is a short, fixed list of oscillator tones. The table below is
//! pure data so it can be asserted on natively; an [`AudioSink`] turns the
//! specs into real sound (Web Audio in the browser, a recorder in tests).

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Symbolic sound category attached to tokens and game events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Bark,
    Meow,
    Moo,
    Oink,
    Roar,
    Cluck,
    Quack,
    Ribbit,
    Squeak,
    Buzz,
    Bubble,
    Hoot,
    Monkey,
    Growl,
    Hop,
    Grunt,
    Flutter,
    Sparkle,
    Love,
    Pop,
    Default,
    Error,
    Flip,
    Success,
    MatchError,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Bark => "bark",
            Cue::Meow => "meow",
            Cue::Moo => "moo",
            Cue::Oink => "oink",
            Cue::Roar => "roar",
            Cue::Cluck => "cluck",
            Cue::Quack => "quack",
            Cue::Ribbit => "ribbit",
            Cue::Squeak => "squeak",
            Cue::Buzz => "buzz",
            Cue::Bubble => "bubble",
            Cue::Hoot => "hoot",
            Cue::Monkey => "monkey",
            Cue::Growl => "growl",
            Cue::Hop => "hop",
            Cue::Grunt => "grunt",
            Cue::Flutter => "flutter",
            Cue::Sparkle => "sparkle",
            Cue::Love => "love",
            Cue::Pop => "pop",
            Cue::Default => "default",
            Cue::Error => "error",
            Cue::Flip => "flip",
            Cue::Success => "success",
            Cue::MatchError => "match-error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ramp {
    Linear,
    Exponential,
}

/// Frequency ramp reaching `hz` at `at_s` seconds after the tone starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sweep {
    pub ramp: Ramp,
    pub hz: f64,
    pub at_s: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Envelope {
    Flat(f32),
    Decay { from: f32, to: f32, ramp: Ramp, over_s: f64 },
}

impl Envelope {
    pub fn peak(&self) -> f32 {
        match *self {
            Envelope::Flat(g) => g,
            Envelope::Decay { from, .. } => from,
        }
    }
}

/// One oscillator voice of a cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    /// Offset from the moment the cue is triggered.
    pub delay_s: f64,
    pub start_hz: f64,
    pub sweep: &'static [Sweep],
    pub gain: Envelope,
    /// Oscillator stop time, relative to the tone start.
    pub duration_s: f64,
}

const TAIL_GAIN: f32 = 0.01;

/// Frequencies the `Default` cue picks from.
pub const DEFAULT_PALETTE: [f64; 5] = [523.25, 587.33, 659.25, 783.99, 880.00];

// Struct literal so `&[exp!(..)]` promotes to 'static.
macro_rules! exp {
    ($hz:expr, $at:expr) => {
        Sweep { ramp: Ramp::Exponential, hz: $hz, at_s: $at }
    };
}

const fn decay(from: f32, over_s: f64) -> Envelope {
    Envelope::Decay { from, to: TAIL_GAIN, ramp: Ramp::Exponential, over_s }
}

const fn tone(
    waveform: Waveform,
    start_hz: f64,
    sweep: &'static [Sweep],
    gain: Envelope,
    duration_s: f64,
) -> ToneSpec {
    ToneSpec { waveform, delay_s: 0.0, start_hz, sweep, gain, duration_s }
}

const fn delayed(spec: ToneSpec, delay_s: f64) -> ToneSpec {
    ToneSpec { delay_s, ..spec }
}

use Waveform::{Sawtooth, Sine, Square};

static BARK: [ToneSpec; 1] = [tone(Sawtooth, 200.0, &[exp!(100.0, 0.1)], decay(0.4, 0.1), 0.12)];
static MEOW: [ToneSpec; 1] = [tone(Sine, 800.0, &[exp!(600.0, 0.1), exp!(700.0, 0.2)], decay(0.3, 0.25), 0.25)];
static MOO: [ToneSpec; 1] = [tone(Sawtooth, 200.0, &[exp!(150.0, 0.4)], decay(0.3, 0.5), 0.5)];
static OINK: [ToneSpec; 1] = [tone(Sine, 400.0, &[exp!(200.0, 0.15)], decay(0.3, 0.15), 0.15)];
static ROAR: [ToneSpec; 1] = [tone(Sawtooth, 150.0, &[exp!(80.0, 0.5)], decay(0.35, 0.6), 0.6)];
static CLUCK: [ToneSpec; 1] = [tone(Square, 800.0, &[], decay(0.2, 0.08), 0.08)];
static QUACK: [ToneSpec; 1] = [tone(Sawtooth, 500.0, &[exp!(300.0, 0.2)], decay(0.3, 0.2), 0.2)];
static RIBBIT: [ToneSpec; 1] = [tone(Sine, 300.0, &[exp!(200.0, 0.15)], decay(0.3, 0.2), 0.2)];
static SQUEAK: [ToneSpec; 1] = [tone(Sine, 2000.0, &[exp!(1500.0, 0.1)], decay(0.25, 0.1), 0.1)];
static BUZZ: [ToneSpec; 1] = [tone(Sawtooth, 250.0, &[], decay(0.2, 0.3), 0.3)];
static BUBBLE: [ToneSpec; 1] = [tone(Sine, 800.0, &[exp!(400.0, 0.15)], decay(0.2, 0.15), 0.15)];
static HOOT: [ToneSpec; 1] = [tone(Sine, 300.0, &[exp!(250.0, 0.3)], decay(0.3, 0.35), 0.35)];
static MONKEY: [ToneSpec; 1] = [tone(Square, 600.0, &[exp!(400.0, 0.1), exp!(500.0, 0.2)], decay(0.25, 0.25), 0.25)];
static GROWL: [ToneSpec; 1] = [tone(Sawtooth, 120.0, &[exp!(80.0, 0.4)], decay(0.3, 0.4), 0.4)];
static HOP: [ToneSpec; 1] = [tone(Sine, 500.0, &[exp!(700.0, 0.08)], decay(0.25, 0.08), 0.08)];
static GRUNT: [ToneSpec; 1] = [tone(Sawtooth, 150.0, &[], decay(0.25, 0.2), 0.2)];
static FLUTTER: [ToneSpec; 1] = [tone(Sine, 1000.0, &[exp!(1200.0, 0.05), exp!(1000.0, 0.1)], decay(0.15, 0.15), 0.15)];
static SPARKLE: [ToneSpec; 1] = [tone(Sine, 1000.0, &[exp!(2000.0, 0.3)], decay(0.25, 0.3), 0.3)];
static LOVE: [ToneSpec; 1] = [tone(Sine, 523.25, &[], decay(0.3, 0.4), 0.4)];
static POP: [ToneSpec; 1] = [tone(Sine, 800.0, &[exp!(200.0, 0.1)], decay(0.35, 0.1), 0.1)];
// start_hz is replaced by a palette pick on every play.
static DEFAULT: [ToneSpec; 1] = [tone(Sine, DEFAULT_PALETTE[0], &[], decay(0.3, 0.3), 0.3)];
// Descending buzz in two steps: 300 → 100 Hz by 0.3s, silent by 0.35s.
static ERROR: [ToneSpec; 2] = [
    tone(Sawtooth, 300.0, &[exp!(200.0, 0.15)], decay(0.3, 0.15), 0.15),
    delayed(tone(Sawtooth, 200.0, &[exp!(100.0, 0.15)], decay(0.3, 0.2), 0.2), 0.15),
];
static FLIP: [ToneSpec; 1] = [tone(Sine, 400.0, &[], decay(0.2, 0.1), 0.1)];
static SUCCESS: [ToneSpec; 3] = [
    tone(Sine, 523.25, &[], decay(0.2, 0.2), 0.2),
    delayed(tone(Sine, 659.25, &[], decay(0.2, 0.2), 0.2), 0.1),
    delayed(tone(Sine, 783.99, &[], decay(0.2, 0.2), 0.2), 0.2),
];
static MATCH_ERROR: [ToneSpec; 1] = [tone(Square, 200.0, &[], decay(0.3, 0.2), 0.2)];

/// Fixed tone table for a cue. `Default` carries a placeholder frequency;
/// use [`ToneSynth::voice`] to get the randomized version.
pub fn tones_for(cue: Cue) -> &'static [ToneSpec] {
    match cue {
        Cue::Bark => &BARK,
        Cue::Meow => &MEOW,
        Cue::Moo => &MOO,
        Cue::Oink => &OINK,
        Cue::Roar => &ROAR,
        Cue::Cluck => &CLUCK,
        Cue::Quack => &QUACK,
        Cue::Ribbit => &RIBBIT,
        Cue::Squeak => &SQUEAK,
        Cue::Buzz => &BUZZ,
        Cue::Bubble => &BUBBLE,
        Cue::Hoot => &HOOT,
        Cue::Monkey => &MONKEY,
        Cue::Growl => &GROWL,
        Cue::Hop => &HOP,
        Cue::Grunt => &GRUNT,
        Cue::Flutter => &FLUTTER,
        Cue::Sparkle => &SPARKLE,
        Cue::Love => &LOVE,
        Cue::Pop => &POP,
        Cue::Default => &DEFAULT,
        Cue::Error => &ERROR,
        Cue::Flip => &FLIP,
        Cue::Success => &SUCCESS,
        Cue::MatchError => &MATCH_ERROR,
    }
}

/// Output side of the synthesizer.
pub trait AudioSink {
    /// Emit `tones` now. Implementations swallow their own failures.
    fn play(&mut self, cue: Cue, tones: &[ToneSpec]);

    /// Called when a round starts so a suspended output can wake up.
    fn resume(&mut self) {}
}

/// Cue player shared by every round engine.
///
/// Built without a sink when audio could not be initialised; in that state
/// sound stays off and every play is a silent no-op.
pub struct ToneSynth {
    sink: Option<Box<dyn AudioSink>>,
    enabled: bool,
    rng: StdRng,
}

impl ToneSynth {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self { sink: Some(sink), enabled: true, rng: StdRng::from_entropy() }
    }

    /// Synthesizer for an environment where audio failed to initialise.
    pub fn unavailable(reason: &str) -> Self {
        log::warn!("audio unavailable, sound disabled: {reason}");
        Self { sink: None, enabled: false, rng: StdRng::seed_from_u64(0) }
    }

    /// Fixes the generator used for the `Default` cue.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn has_output(&self) -> bool {
        self.sink.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.sink.is_some()
    }

    /// Sets the sound flag. Without an output it stays off.
    pub fn set_enabled(&mut self, on: bool) -> bool {
        self.enabled = on && self.sink.is_some();
        self.enabled
    }

    /// Tones for one play of `cue`.
    pub fn voice(&mut self, cue: Cue) -> Vec<ToneSpec> {
        let mut tones = tones_for(cue).to_vec();
        if cue == Cue::Default {
            let hz = DEFAULT_PALETTE
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(DEFAULT_PALETTE[0]);
            for t in &mut tones {
                t.start_hz = hz;
            }
        }
        tones
    }

    pub fn play_cue(&mut self, cue: Cue) {
        if !self.is_enabled() {
            return;
        }
        let tones = self.voice(cue);
        if let Some(sink) = self.sink.as_mut() {
            sink.play(cue, &tones);
        }
    }

    pub fn resume(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.resume();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::RecordingSink;

    const ALL: [Cue; 25] = [
        Cue::Bark, Cue::Meow, Cue::Moo, Cue::Oink, Cue::Roar, Cue::Cluck, Cue::Quack,
        Cue::Ribbit, Cue::Squeak, Cue::Buzz, Cue::Bubble, Cue::Hoot, Cue::Monkey, Cue::Growl,
        Cue::Hop, Cue::Grunt, Cue::Flutter, Cue::Sparkle, Cue::Love, Cue::Pop, Cue::Default,
        Cue::Error, Cue::Flip, Cue::Success, Cue::MatchError,
    ];

    #[test]
    fn every_cue_has_audible_bounded_tones() {
        for cue in ALL {
            let tones = tones_for(cue);
            assert!(!tones.is_empty(), "{} has no tones", cue.name());
            for t in tones {
                assert!(t.start_hz > 0.0);
                assert!(t.duration_s > 0.0 && t.duration_s <= 0.6, "{}", cue.name());
                assert!(t.gain.peak() > 0.0 && t.gain.peak() <= 0.4);
                for s in t.sweep {
                    assert!(s.hz > 0.0 && s.at_s <= t.duration_s);
                }
            }
        }
    }

    /// (waveform, delay, start Hz, sweep steps, peak gain, decay time, stop)
    type Voice = (Waveform, f64, f64, Vec<(f64, f64)>, f32, f64, f64);

    fn v(wave: Waveform, delay: f64, hz: f64, sweep: &[(f64, f64)], peak: f32, over: f64, stop: f64) -> Voice {
        (wave, delay, hz, sweep.to_vec(), peak, over, stop)
    }

    fn expected(cue: Cue) -> Vec<Voice> {
        use Waveform::{Sawtooth as Saw, Sine, Square};
        match cue {
            Cue::Bark => vec![v(Saw, 0.0, 200.0, &[(100.0, 0.1)], 0.4, 0.1, 0.12)],
            Cue::Meow => vec![v(Sine, 0.0, 800.0, &[(600.0, 0.1), (700.0, 0.2)], 0.3, 0.25, 0.25)],
            Cue::Moo => vec![v(Saw, 0.0, 200.0, &[(150.0, 0.4)], 0.3, 0.5, 0.5)],
            Cue::Oink => vec![v(Sine, 0.0, 400.0, &[(200.0, 0.15)], 0.3, 0.15, 0.15)],
            Cue::Roar => vec![v(Saw, 0.0, 150.0, &[(80.0, 0.5)], 0.35, 0.6, 0.6)],
            Cue::Cluck => vec![v(Square, 0.0, 800.0, &[], 0.2, 0.08, 0.08)],
            Cue::Quack => vec![v(Saw, 0.0, 500.0, &[(300.0, 0.2)], 0.3, 0.2, 0.2)],
            Cue::Ribbit => vec![v(Sine, 0.0, 300.0, &[(200.0, 0.15)], 0.3, 0.2, 0.2)],
            Cue::Squeak => vec![v(Sine, 0.0, 2000.0, &[(1500.0, 0.1)], 0.25, 0.1, 0.1)],
            Cue::Buzz => vec![v(Saw, 0.0, 250.0, &[], 0.2, 0.3, 0.3)],
            Cue::Bubble => vec![v(Sine, 0.0, 800.0, &[(400.0, 0.15)], 0.2, 0.15, 0.15)],
            Cue::Hoot => vec![v(Sine, 0.0, 300.0, &[(250.0, 0.3)], 0.3, 0.35, 0.35)],
            Cue::Monkey => vec![v(Square, 0.0, 600.0, &[(400.0, 0.1), (500.0, 0.2)], 0.25, 0.25, 0.25)],
            Cue::Growl => vec![v(Saw, 0.0, 120.0, &[(80.0, 0.4)], 0.3, 0.4, 0.4)],
            Cue::Hop => vec![v(Sine, 0.0, 500.0, &[(700.0, 0.08)], 0.25, 0.08, 0.08)],
            Cue::Grunt => vec![v(Saw, 0.0, 150.0, &[], 0.25, 0.2, 0.2)],
            Cue::Flutter => vec![v(Sine, 0.0, 1000.0, &[(1200.0, 0.05), (1000.0, 0.1)], 0.15, 0.15, 0.15)],
            Cue::Sparkle => vec![v(Sine, 0.0, 1000.0, &[(2000.0, 0.3)], 0.25, 0.3, 0.3)],
            Cue::Love => vec![v(Sine, 0.0, 523.25, &[], 0.3, 0.4, 0.4)],
            Cue::Pop => vec![v(Sine, 0.0, 800.0, &[(200.0, 0.1)], 0.35, 0.1, 0.1)],
            Cue::Default => vec![v(Sine, 0.0, 523.25, &[], 0.3, 0.3, 0.3)],
            Cue::Error => vec![
                v(Saw, 0.0, 300.0, &[(200.0, 0.15)], 0.3, 0.15, 0.15),
                v(Saw, 0.15, 200.0, &[(100.0, 0.15)], 0.3, 0.2, 0.2),
            ],
            Cue::Flip => vec![v(Sine, 0.0, 400.0, &[], 0.2, 0.1, 0.1)],
            Cue::Success => vec![
                v(Sine, 0.0, 523.25, &[], 0.2, 0.2, 0.2),
                v(Sine, 0.1, 659.25, &[], 0.2, 0.2, 0.2),
                v(Sine, 0.2, 783.99, &[], 0.2, 0.2, 0.2),
            ],
            Cue::MatchError => vec![v(Square, 0.0, 200.0, &[], 0.3, 0.2, 0.2)],
        }
    }

    #[test]
    fn every_cue_matches_its_table_row() {
        for cue in ALL {
            let actual: Vec<Voice> = tones_for(cue)
                .iter()
                .map(|t| {
                    let Envelope::Decay { from, to, ramp, over_s } = t.gain else {
                        panic!("{} should decay", cue.name());
                    };
                    assert_eq!((to, ramp), (TAIL_GAIN, Ramp::Exponential), "{}", cue.name());
                    assert!(t.sweep.iter().all(|s| s.ramp == Ramp::Exponential));
                    let sweep = t.sweep.iter().map(|s| (s.hz, s.at_s)).collect();
                    (t.waveform, t.delay_s, t.start_hz, sweep, from, over_s, t.duration_s)
                })
                .collect();
            assert_eq!(actual, expected(cue), "{}", cue.name());
        }
    }

    #[test]
    fn error_ramp_ends_at_a_third_of_a_second() {
        let tones = tones_for(Cue::Error);
        let last = tones[1];
        assert!((last.delay_s + last.sweep[0].at_s - 0.3).abs() < 1e-9);
        assert_eq!(last.sweep[0].hz, 100.0);
        assert!((last.delay_s + last.duration_s - 0.35).abs() < 1e-9);
    }

    #[test]
    fn bark_envelope_matches_table() {
        let t = tones_for(Cue::Bark)[0];
        assert_eq!(t.waveform, Waveform::Sawtooth);
        assert_eq!(t.start_hz, 200.0);
        assert_eq!(t.sweep, &[Sweep { ramp: Ramp::Exponential, hz: 100.0, at_s: 0.1 }]);
        assert_eq!(
            t.gain,
            Envelope::Decay { from: 0.4, to: 0.01, ramp: Ramp::Exponential, over_s: 0.1 }
        );
        assert_eq!(t.duration_s, 0.12);
    }

    #[test]
    fn error_is_two_sequential_tones() {
        let tones = tones_for(Cue::Error);
        assert_eq!(tones.len(), 2);
        assert_eq!(tones[0].delay_s, 0.0);
        assert_eq!(tones[1].delay_s, tones[0].duration_s);
        assert!(tones[1].start_hz < tones[0].start_hz);
    }

    #[test]
    fn success_is_ascending_arpeggio() {
        let hz: Vec<f64> = tones_for(Cue::Success).iter().map(|t| t.start_hz).collect();
        assert_eq!(hz, vec![523.25, 659.25, 783.99]);
        let delays: Vec<f64> = tones_for(Cue::Success).iter().map(|t| t.delay_s).collect();
        assert_eq!(delays, vec![0.0, 0.1, 0.2]);
    }

    #[test]
    fn default_picks_from_palette() {
        let mut synth = ToneSynth::new(Box::new(RecordingSink::default())).with_seed(7);
        for _ in 0..20 {
            let v = synth.voice(Cue::Default);
            assert!(DEFAULT_PALETTE.contains(&v[0].start_hz));
        }
    }

    #[test]
    fn played_default_cue_uses_one_palette_pitch() {
        let sink = RecordingSink::default();
        let mut synth = ToneSynth::new(Box::new(sink.clone())).with_seed(3);
        assert!(synth.has_output());
        synth.play_cue(Cue::Default);
        let tones = sink.last_tones().unwrap();
        assert_eq!(sink.cues(), vec![Cue::Default]);
        assert_eq!(tones.len(), 1);
        assert!(DEFAULT_PALETTE.contains(&tones[0].start_hz));
        assert_eq!(tones[0].waveform, Waveform::Sine);
        assert_eq!(tones[0].duration_s, 0.3);
    }

    #[test]
    fn disabled_synth_is_silent() {
        let sink = RecordingSink::default();
        let mut synth = ToneSynth::new(Box::new(sink.clone()));
        synth.set_enabled(false);
        synth.play_cue(Cue::Pop);
        assert!(sink.cues().is_empty());
        synth.set_enabled(true);
        synth.play_cue(Cue::Pop);
        assert_eq!(sink.cues(), vec![Cue::Pop]);
    }

    #[test]
    fn unavailable_synth_cannot_be_enabled() {
        let mut synth = ToneSynth::unavailable("no AudioContext");
        assert!(!synth.has_output());
        assert!(!synth.set_enabled(true));
        assert!(!synth.is_enabled());
        synth.play_cue(Cue::Bark);
    }
}
