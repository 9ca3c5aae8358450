// Integration tests for noise and option chain synthesis

mod common;

use common::sample_underlyings;
use mock_broker::{ChainConfig, ChainSynthesizer, NoiseSource, ScriptedRandom, SharedRandom};

#[test]
fn test_noise_is_deterministic_per_seed() {
    let a = NoiseSource::new(42);
    let b = NoiseSource::new(42);

    for k in 0..1_000 {
        let x = k as f64 * 0.137 - 40.0;
        assert_eq!(a.sample(x), b.sample(x));
        assert_eq!(a.sample(x), a.sample(x));
    }
}

#[test]
fn test_noise_seed_one_is_zero_at_origin() {
    let noise = NoiseSource::new(1);
    assert_eq!(noise.sample(0.0), 0.0);
    assert_eq!(noise.sample(1.0), 0.0);
}

#[test]
fn test_noise_is_continuous() {
    let noise = NoiseSource::new(1337);
    for k in 0..500 {
        let x = k as f64 * 0.731;
        let delta = (noise.sample(x + 1e-7) - noise.sample(x)).abs();
        assert!(delta < 1e-5, "jump of {} at x={}", delta, x);
    }
}

#[test]
fn test_noise_is_bounded() {
    let noise = NoiseSource::new(9001);
    for k in 0..10_000 {
        let v = noise.sample(k as f64 * 0.013);
        assert!((-1.0..=1.0).contains(&v));
    }
}

#[test]
fn test_price_and_chain_seeds_decorrelate() {
    let price = NoiseSource::new(42);
    let chain = NoiseSource::new(9001);
    let differs = (0..50).any(|k| {
        let x = k as f64 * 0.3 + 0.1;
        (price.sample(x) - chain.sample(x)).abs() > 1e-6
    });
    assert!(differs);
}

#[test]
fn test_chain_at_100_has_strikes_101_to_112() {
    let synth = ChainSynthesizer::new(&ChainConfig::default());
    let mut rng = ScriptedRandom::constant(0.3);
    let chain = synth.synthesize(100.0, 0, &mut rng);

    assert_eq!(chain.len(), 12);
    for (i, option) in chain.iter().enumerate() {
        assert_eq!(option.strike, 101.0 + i as f64);
        assert_eq!(option.id, format!("put-{}", 101 + i));
        assert!(option.ask_premium - option.bid_premium >= 7.0 - 1e-9);
    }
}

#[test]
fn test_chain_invariants_across_prices_and_times() {
    let synth = ChainSynthesizer::new(&ChainConfig::default());
    let rng = SharedRandom::seeded(2024);

    for underlying in sample_underlyings() {
        for step in 0..40_i64 {
            let now_ms = 1_700_000_000_000 + step * 600;
            let chain = {
                let mut draws = rng.lock();
                synth.synthesize(underlying, now_ms, &mut **draws)
            };

            assert_eq!(chain.len(), 12);
            let first = (underlying * 1.01).ceil();
            for (i, o) in chain.iter().enumerate() {
                assert_eq!(o.strike, first + i as f64);
                assert!(o.ask_premium - o.bid_premium >= 7.0 - 1e-9,
                    "spread {} at strike {} under {}", o.ask_premium - o.bid_premium, o.strike, underlying);
                assert!(o.bid_premium >= 0.01);
                assert!(o.ask_premium <= 1000.0);
                assert!(o.ask_premium > o.bid_premium);
                assert!((50..=99).contains(&o.prob_itm), "prob_itm {}", o.prob_itm);
                assert!(o.bid_size >= 1);
            }
        }
    }
}

#[test]
fn test_chain_premiums_are_rounded_to_cents() {
    let synth = ChainSynthesizer::new(&ChainConfig::default());
    let mut rng = ScriptedRandom::constant(0.5);
    for o in synth.synthesize(733.3, 98_765, &mut rng) {
        for premium in [o.ask_premium, o.bid_premium] {
            let cents = premium * 100.0;
            assert!((cents - cents.round()).abs() < 1e-6, "{} not in cents", premium);
        }
    }
}

#[test]
fn test_chain_only_sizes_depend_on_draws() {
    let synth = ChainSynthesizer::new(&ChainConfig::default());
    let low = synth.synthesize(250.0, 5_000, &mut ScriptedRandom::constant(0.0));
    let high = synth.synthesize(250.0, 5_000, &mut ScriptedRandom::constant(0.9));

    for (a, b) in low.iter().zip(&high) {
        assert_eq!(a.strike, b.strike);
        assert_eq!(a.ask_premium, b.ask_premium);
        assert_eq!(a.bid_premium, b.bid_premium);
        assert!(a.bid_size <= b.bid_size);
    }
}

#[test]
fn test_custom_depth() {
    let config = ChainConfig { depth: 4, ..ChainConfig::default() };
    let synth = ChainSynthesizer::new(&config);
    let chain = synth.synthesize(100.0, 0, &mut ScriptedRandom::constant(0.5));
    assert_eq!(chain.len(), 4);
    assert_eq!(chain.last().map(|o| o.strike), Some(104.0));

    // sizes and time value scale with the configured depth: (4 - i) * (0.5 + 0.5)
    let sizes: Vec<u32> = chain.iter().map(|o| o.bid_size).collect();
    assert_eq!(sizes, vec![4, 3, 2, 1]);
}

#[test]
fn test_known_chain_head_at_250() {
    let synth = ChainSynthesizer::new(&ChainConfig::default());
    let chain = synth.synthesize(250.0, 0, &mut ScriptedRandom::constant(0.5));
    assert_eq!(chain[0].strike, 253.0);
    assert_eq!(chain[0].id, "put-253");
    assert_eq!(chain[0].ask_premium, 7.01);
    assert_eq!(chain[0].bid_premium, 0.01);
}
