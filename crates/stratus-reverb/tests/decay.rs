//! Long-run behavior of the reverb tail.

use stratus_reverb::{ParamKey, ReverbEngine};

const SAMPLE_RATE: usize = 48_000;

fn rms(window: &[f32]) -> f32 {
    (window.iter().map(|s| s * s).sum::<f32>() / window.len() as f32).sqrt()
}

/// Feed a stereo impulse and capture `seconds` of fully wet output.
fn impulse_tail(engine: &mut ReverbEngine, seconds: usize) -> (Vec<f32>, Vec<f32>) {
    let n = seconds * SAMPLE_RATE;
    let mut left = vec![0.0f32; n];
    let mut right = vec![0.0f32; n];
    left[0] = 1.0;
    right[0] = 1.0;
    engine.process(&mut left, &mut right);
    (left, right)
}

#[test]
fn short_decay_tail_dies_out() {
    let mut engine = ReverbEngine::new(48_000.0);
    engine.set_param(ParamKey::Mix, 1.0);
    engine.set_param(ParamKey::Decay, 0.3);

    let (left, right) = impulse_tail(&mut engine, 4);

    for channel in [&left, &right] {
        assert!(channel.iter().all(|s| s.is_finite()));

        // A sub-second decay setting: the first half second dominates and
        // the final second is negligible.
        let early = rms(&channel[..SAMPLE_RATE / 2]);
        let late = rms(&channel[3 * SAMPLE_RATE..]);
        assert!(early > 1e-4, "no tail produced, early rms {early}");
        assert!(late < early * 0.01, "tail failed to decay: {late} vs {early}");
        assert!(late < 1e-3, "residual energy after 3 s: {late}");
    }
}

#[test]
fn tail_energy_trends_downward() {
    let mut engine = ReverbEngine::new(48_000.0);
    engine.set_param(ParamKey::Mix, 1.0);
    engine.set_param(ParamKey::Decay, 0.5);

    let (left, _) = impulse_tail(&mut engine, 6);

    // Compare half-second windows starting after the onset. Modulation
    // makes individual windows noisy, so require a monotonic trend across
    // window pairs spaced a second apart rather than strict ordering.
    let half = SAMPLE_RATE / 2;
    let windows: Vec<f32> = (1..10).map(|w| rms(&left[w * half..(w + 1) * half])).collect();
    for i in 0..windows.len() - 2 {
        assert!(
            windows[i + 2] < windows[i] * 1.05,
            "tail energy rose from window {i}: {:?}",
            windows
        );
    }
}

#[test]
fn silence_in_silence_out() {
    let mut engine = ReverbEngine::new(48_000.0);
    engine.set_param(ParamKey::Mix, 1.0);

    let mut left = vec![0.0f32; 2 * SAMPLE_RATE];
    let mut right = vec![0.0f32; 2 * SAMPLE_RATE];
    engine.process(&mut left, &mut right);

    assert!(left.iter().all(|&s| s == 0.0));
    assert!(right.iter().all(|&s| s == 0.0));
}

#[test]
fn long_decay_sustains_longer_than_short() {
    let build = |decay: f32| {
        let mut e = ReverbEngine::new(48_000.0);
        e.set_param(ParamKey::Mix, 1.0);
        e.set_param(ParamKey::Decay, decay);
        e
    };
    let (short_tail, _) = impulse_tail(&mut build(0.2), 4);
    let (long_tail, _) = impulse_tail(&mut build(0.9), 4);

    let late_short = rms(&short_tail[3 * SAMPLE_RATE..]);
    let late_long = rms(&long_tail[3 * SAMPLE_RATE..]);
    assert!(
        late_long > late_short * 10.0,
        "decay control had no effect: {late_long} vs {late_short}"
    );
}
