//! Invariants that hold for any pull sequence.

use approx::assert_relative_eq;
use banditsim::prelude::*;
use proptest::prelude::*;
use rand::SeedableRng;

fn all_policies() -> Vec<LearningPolicy> {
    vec![
        LearningPolicy::Random,
        LearningPolicy::Greedy,
        LearningPolicy::EpsilonGreedy { epsilon: 0.3 },
        LearningPolicy::Ucb {
            alpha: 1.0,
            index: IndexFn::B5,
        },
        LearningPolicy::KlUcb { index: IndexFn::B2 },
        LearningPolicy::BayesGauss { index: IndexFn::B1 },
        LearningPolicy::BetaThompson,
        LearningPolicy::GaussianThompson,
    ]
}

proptest! {
    #[test]
    fn stochastic_means_match_replayed_rewards(
        seed in any::<u64>(),
        means in proptest::collection::vec(0.0f64..=1.0, 1..6),
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..200),
    ) {
        let arms: Vec<Arm> = means.iter().map(|&m| Arm::normal(m * 4.0, 1.0).unwrap()).collect();
        let mut bandit = Bandit::from_arms(arms, None, false).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

        let mut observed = vec![Vec::new(); means.len()];
        for pick in &picks {
            let arm = pick.index(means.len());
            observed[arm].push(bandit.pull(arm, &mut rng).unwrap());
        }

        prop_assert_eq!(bandit.pull_counts().iter().sum::<u64>(), picks.len() as u64);
        prop_assert_eq!(bandit.timestep(), picks.len() as u64);
        let running = bandit.as_stochastic().unwrap().running_means();
        for (arm, rewards) in observed.iter().enumerate() {
            prop_assert_eq!(bandit.pull_counts()[arm], rewards.len() as u64);
            if !rewards.is_empty() {
                let exact = rewards.iter().sum::<f64>() / rewards.len() as f64;
                prop_assert!((running[arm] - exact).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn reset_matches_fresh_bandit(
        seed in any::<u64>(),
        means in proptest::collection::vec(0.0f64..=1.0, 1..5),
        pulls in 0usize..100,
    ) {
        let arms: Vec<Arm> = means.iter().map(|&m| Arm::bernoulli(m).unwrap()).collect();
        let fresh = Bandit::from_arms(arms.clone(), None, false).unwrap();
        let mut bandit = Bandit::from_arms(arms, None, false).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        for k in 0..pulls {
            bandit.pull(k % means.len(), &mut rng).unwrap();
        }
        bandit.reset();
        prop_assert_eq!(bandit.regret(), 0.0);
        prop_assert_eq!(bandit.snapshot(), fresh.snapshot());
    }

    #[test]
    fn gram_matrix_stays_positive_definite(
        seed in any::<u64>(),
        features in proptest::collection::vec(
            proptest::collection::vec(-5.0f64..5.0, 3), 1..6),
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..150),
    ) {
        let arms: Vec<Arm> = features.iter().map(|f| Arm::linear(f.clone()).unwrap()).collect();
        let mut bandit = Bandit::from_arms(arms, Some(vec![0.5, -1.0, 2.0]), false).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        for pick in &picks {
            bandit.pull(pick.index(features.len()), &mut rng).unwrap();
        }
        let model = bandit.as_linear().unwrap().model();
        prop_assert!(model.gram_is_positive_definite());
    }

    #[test]
    fn policies_pick_valid_arms(
        seed in any::<u64>(),
        means in proptest::collection::vec(0.0f64..=1.0, 1..6),
        steps in 0u64..60,
    ) {
        for policy in all_policies() {
            let arms: Vec<Arm> = means.iter().map(|&m| Arm::bernoulli(m).unwrap()).collect();
            let mut bandit = Bandit::from_arms(arms, None, false).unwrap();
            bandit.set_horizon(100).unwrap();
            let policy = policy.build().unwrap();
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            for _ in 0..steps {
                let arm = policy.select(&mut bandit, &mut rng).unwrap();
                prop_assert!(arm < means.len(), "{} chose {}", policy.name(), arm);
                bandit.pull(arm, &mut rng).unwrap();
            }
        }
    }

    #[test]
    fn forced_exploration_pulls_each_arm_once(
        seed in any::<u64>(),
        n_arms in 1usize..8,
        extra in 0u64..20,
    ) {
        let arms: Vec<Arm> = (0..n_arms).map(|i| Arm::bernoulli(i as f64 / n_arms as f64).unwrap()).collect();
        let bandit = Bandit::from_arms(arms, None, false).unwrap();
        let mut sim = Simulation::builder()
            .bandit(bandit)
            .policy(Greedy)
            .seed(seed)
            .build()
            .unwrap();
        let mut after_exploration = None;
        sim.run_view(n_arms as u64 + extra, |snap| {
            if snap.timestep == n_arms as u64 {
                after_exploration = Some(snap.pull_count.clone());
            }
        }).unwrap();
        prop_assert_eq!(after_exploration, Some(vec![1; n_arms]));
    }
}

#[test]
fn test_linear_estimate_matches_direct_solve() {
    let mut bandit = Bandit::from_arms(
        vec![
            Arm::linear(vec![1.0, 2.0]).unwrap(),
            Arm::linear(vec![-1.0, 0.5]).unwrap(),
            Arm::linear(vec![0.3, -0.7]).unwrap(),
        ],
        Some(vec![1.0, 1.0]),
        false,
    )
    .unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for k in 0..500 {
        bandit.pull(k % 3, &mut rng).unwrap();
    }

    // Solve G w = b directly for the 2x2 case.
    let model = bandit.as_linear().unwrap().model();
    let g = model.gram_rows();
    let b = &model.weighted_sum;
    let det = g[0][0] * g[1][1] - g[0][1] * g[1][0];
    let w0 = (g[1][1] * b[0] - g[0][1] * b[1]) / det;
    let w1 = (g[0][0] * b[1] - g[1][0] * b[0]) / det;
    let estimate = bandit.as_linear().unwrap().weight_estimate();
    assert_relative_eq!(estimate[0], w0, epsilon = 1e-8);
    assert_relative_eq!(estimate[1], w1, epsilon = 1e-8);
}
