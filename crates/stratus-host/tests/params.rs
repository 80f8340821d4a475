//! End-to-end checks of the host-facing PCM and parameter surface.

use stratus_host::{AudioFx, ReverbFx};

#[test]
fn silent_pcm_stays_digitally_silent() {
    let mut fx = ReverbFx::new();
    fx.set_param("mix", "1.0");

    let mut frames = vec![0i16; 4096];
    for _ in 0..20 {
        fx.process_block(&mut frames);
        assert!(frames.iter().all(|&s| s == 0));
    }
}

#[test]
fn impulse_leaves_a_tail_in_later_blocks() {
    let mut fx = ReverbFx::new();
    fx.set_param("mix", "1.0");

    let mut frames = vec![0i16; 2048];
    frames[0] = i16::MAX;
    frames[1] = i16::MAX;
    fx.process_block(&mut frames);

    // Keep feeding silence; the late network must keep producing output
    // well after the impulse block.
    let mut tail_energy = 0i64;
    for _ in 0..40 {
        let mut silence = vec![0i16; 2048];
        fx.process_block(&mut silence);
        tail_energy += silence.iter().map(|&s| i64::from(s).pow(2)).sum::<i64>();
    }
    assert!(tail_energy > 0, "no reverb tail reached the output");
}

#[test]
fn one_large_call_matches_block_sized_calls() {
    let mut whole = ReverbFx::new();
    let mut split = ReverbFx::new();
    for fx in [&mut whole, &mut split] {
        fx.set_param("mix", "1.0");
        fx.set_param("size", "0.2");
    }

    // 2.5 blocks of noisy PCM in one call versus 128-frame slices. The
    // internal scratch holds one block, so the large call is walked in
    // block-sized steps and must land on the same samples.
    let input: Vec<i16> = (0..640).map(|i| ((i * 263) % 4001) as i16 - 2000).collect();
    let mut big = input.clone();
    whole.process_block(&mut big);

    let mut pieces = input;
    for chunk in pieces.chunks_mut(256) {
        split.process_block(chunk);
    }
    assert_eq!(big, pieces);
}

#[test]
fn dry_mix_passes_audio_through() {
    let mut fx = ReverbFx::new();
    fx.set_param("mix", "0");

    let input: Vec<i16> = (0..512).map(|i| ((i * 37) % 2000) as i16 - 1000).collect();
    let mut frames = input.clone();
    fx.process_block(&mut frames);

    // One LSB of loss is allowed from the 32768-in / 32767-out scaling.
    for (a, b) in input.iter().zip(frames.iter()) {
        assert!((i32::from(*a) - i32::from(*b)).abs() <= 1);
    }
}

#[test]
fn parameter_surface_matches_wire_format() {
    let mut fx = ReverbFx::new();
    for key in [
        "decay",
        "mix",
        "predelay",
        "size",
        "diffusion",
        "low_cut",
        "high_cut",
        "cross_seed",
        "mod_rate",
        "mod_amount",
    ] {
        fx.set_param(key, "0.75");
        assert_eq!(fx.get_param(key).as_deref(), Some("0.75"), "key {key}");
    }
}

#[test]
fn reset_keeps_parameters_but_drops_state() {
    let mut fx = ReverbFx::new();
    fx.set_param("mix", "1.0");

    let mut frames = vec![0i16; 2048];
    frames[0] = i16::MAX;
    fx.process_block(&mut frames);
    fx.reset();

    let mut silence = vec![0i16; 2048];
    fx.process_block(&mut silence);
    assert!(silence.iter().all(|&s| s == 0));
    assert_eq!(fx.get_param("mix").as_deref(), Some("1.00"));
}
