//! Pawtime Headless Simulation Harness
//!
//! Scripts the pet engine through its core guarantees and prints a pass/fail
//! table. Runs entirely in-process: no front-end, no network.
//!
//! Usage:
//!   cargo run -p pawtime-simtest
//!   cargo run -p pawtime-simtest -- --verbose
//!   cargo run -p pawtime-simtest -- --seed 7 --config rates.json

use pawtime_core::persistence::{self, Format};
use pawtime_core::prelude::*;
use pawtime_logic::actions::{Outcome, Refusal};
use pawtime_logic::attributes::Attribute;
use pawtime_logic::codec::{decode, encode};
use pawtime_logic::config::SimConfig;
use pawtime_logic::decay::{self, TickOutcome};
use pawtime_logic::environment::{Season, Weather};
use pawtime_logic::growth::{stage_for_age, GrowthStage};
use pawtime_logic::skills::{self, success_chance, MAX_SKILL_LEVEL};
use pawtime_logic::status::Mood;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Real seconds per game day under the default rate table.
const DAY: f64 = 300.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
    config: Option<String>,
}

fn parse_args() -> Options {
    let mut opts = Options {
        verbose: false,
        seed: 42,
        config: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => opts.verbose = true,
            "--seed" => {
                if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
                    opts.seed = seed;
                }
            }
            "--config" => opts.config = args.next(),
            other => eprintln!("ignoring unknown argument {other}"),
        }
    }
    opts
}

fn main() {
    let opts = parse_args();
    println!("=== Pawtime Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Rate table
    let rules = load_rules(&opts, &mut results).unwrap_or_else(Ruleset::standard);

    // 2. Bounds under random play
    results.extend(validate_bounds(&rules, opts.seed, opts.verbose));

    // 3. Decay model
    results.extend(validate_decay(&rules, opts.verbose));

    // 4. Growth stages
    results.extend(validate_growth(&rules, opts.verbose));

    // 5. Actions and training
    results.extend(validate_actions(&rules));

    // 6. Sleep through the engine
    results.extend(validate_sleep_cycle(&rules));

    // 7. Persistence
    results.extend(validate_persistence(&rules, opts.seed));

    // 8. A week with the engine
    results.extend(simulate_week(&rules, opts.seed, opts.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn fresh(name: &str) -> Pet {
    Pet::new(name, "柯基", "活泼", 0.0)
}

// ── 1. Rate table ───────────────────────────────────────────────────────

fn load_rules(opts: &Options, results: &mut Vec<TestResult>) -> Option<Ruleset> {
    println!("--- Rate Table ---");

    let partial = SimConfig::from_json_str(r#"{"decay": {"seconds_per_game_day": 60}}"#);
    let partial_ok = matches!(&partial, Ok(c)
        if c.decay.seconds_per_game_day == 60.0
            && c.decay.hunger_per_day == SimConfig::default().decay.hunger_per_day);
    results.push(TestResult {
        name: "config_partial_override".into(),
        passed: partial_ok,
        detail: "missing keys keep defaults".into(),
    });

    let path = opts.config.as_ref()?;
    match persistence::load_config(path) {
        Ok(config) => {
            results.push(TestResult {
                name: "config_file".into(),
                passed: true,
                detail: format!("loaded {path}"),
            });
            Some(Ruleset::with_config(config))
        }
        Err(e) => {
            results.push(TestResult {
                name: "config_file".into(),
                passed: false,
                detail: format!("{path}: {e}"),
            });
            None
        }
    }
}

// ── 2. Bounds ───────────────────────────────────────────────────────────

fn random_action(rng: &mut StdRng) -> Action {
    match rng.gen_range(0..7) {
        0 => Action::Feed(Food::ALL[rng.gen_range(0..Food::ALL.len())]),
        1 => Action::Play(Game::ALL[rng.gen_range(0..Game::ALL.len())]),
        2 => Action::Bath,
        3 => Action::Sleep {
            hours: rng.gen_range(1.0..10.0),
        },
        4 => Action::Train(skills::TRAINABLE_SKILLS[rng.gen_range(0..6)].to_string()),
        5 => Action::Pet,
        _ => Action::Perform(skills::SHAKE.to_string()),
    }
}

fn validate_bounds(rules: &Ruleset, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Bounds Under Random Play ---");
    let mut results = Vec::new();

    let runs = 50;
    let steps = 500;
    let mut violations = 0;
    let mut applied = 0;
    let mut refused = 0;

    for run in 0..runs {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(run));
        let mut pet = fresh("随机");
        for _ in 0..steps {
            if rng.gen_bool(0.3) {
                decay::advance(&mut pet, rng.gen_range(0.0..10.0 * DAY), rules);
            } else {
                let action = random_action(&mut rng);
                let report = pawtime_logic::actions::resolve(&mut pet, action, rules, &mut rng);
                match report.outcome {
                    Outcome::Refused(_) => refused += 1,
                    _ => applied += 1,
                }
            }
            if !pet.is_consistent() {
                violations += 1;
            }
        }
    }

    results.push(TestResult {
        name: "bounds_random_play".into(),
        passed: violations == 0,
        detail: format!("{runs} runs × {steps} steps, {violations} invariant violations"),
    });
    results.push(TestResult {
        name: "bounds_mix_of_outcomes".into(),
        passed: applied > 0 && refused > 0,
        detail: format!("{applied} applied, {refused} refused"),
    });

    if verbose {
        println!("  {} actions resolved", applied + refused);
    }
    results
}

// ── 3. Decay ────────────────────────────────────────────────────────────

fn validate_decay(rules: &Ruleset, verbose: bool) -> Vec<TestResult> {
    println!("--- Decay Model ---");
    let mut results = Vec::new();

    // One tick of T equals two ticks of T/2 for every breed
    let mut worst: f64 = 0.0;
    for breed in rules.traits.breed_names() {
        let mut whole = Pet::new("甲", breed, "顽皮", 0.0);
        let mut halves = whole.clone();
        decay::advance(&mut whole, 9.0 * DAY, rules);
        decay::advance(&mut halves, 4.5 * DAY, rules);
        decay::advance(&mut halves, 4.5 * DAY, rules);
        for attr in Attribute::ALL {
            worst = worst.max((whole.attributes().get(attr) - halves.attributes().get(attr)).abs());
        }
    }
    results.push(TestResult {
        name: "decay_tick_decomposition".into(),
        passed: worst < 1e-9,
        detail: format!("max drift {worst:e}"),
    });

    // Neglect hurts, care heals
    let mut neglected = fresh("脏兮兮");
    neglected.attributes_mut().set(Attribute::Hunger, 5.0);
    neglected.attributes_mut().set(Attribute::Cleanliness, 5.0);
    decay::advance(&mut neglected, DAY, rules);
    let mut cared = fresh("乖乖");
    cared.attributes_mut().set(Attribute::Health, 60.0);
    decay::advance(&mut cared, DAY, rules);
    results.push(TestResult {
        name: "decay_health_effects".into(),
        passed: neglected.attributes().health() < 100.0 && cared.attributes().health() > 60.0,
        detail: format!(
            "neglected health {:.2}, cared-for health {:.2}",
            neglected.attributes().health(), cared.attributes().health()
        ),
    });

    // Harsh weather speeds decay
    let mut mild = fresh("晴天");
    let mut harsh = fresh("雪天");
    let blizzard = Environment {
        weather: Weather::Snowy,
        season: Season::Winter,
        is_day: false,
    };
    decay::advance(&mut mild, 5.0 * DAY, rules);
    decay::advance_in(&mut harsh, 5.0 * DAY, rules, &blizzard);
    results.push(TestResult {
        name: "decay_environment".into(),
        passed: harsh.attributes().cleanliness() < mild.attributes().cleanliness()
            && harsh.attributes().energy() < mild.attributes().energy()
            && harsh.attributes().happiness() > mild.attributes().happiness(),
        detail: "snowy winter night: dirtier, more tired, slower boredom".into(),
    });

    if verbose {
        println!(
            "  5 days mild: {:?}\n  5 days harsh: {:?}",
            mild.attributes(), harsh.attributes()
        );
    }
    results
}

// ── 4. Growth ───────────────────────────────────────────────────────────

fn validate_growth(rules: &Ruleset, verbose: bool) -> Vec<TestResult> {
    println!("--- Growth Stages ---");
    let mut results = Vec::new();
    let cfg = &rules.config.growth;

    let mut monotonic = true;
    let mut previous = GrowthStage::Puppy;
    for day in 0..1_500 {
        let stage = stage_for_age(f64::from(day), cfg);
        monotonic &= stage >= previous;
        previous = stage;
    }
    results.push(TestResult {
        name: "growth_monotonic".into(),
        passed: monotonic && previous == GrowthStage::Senior,
        detail: format!("day 1499 stage {}", previous.label()),
    });

    // Live a whole life in monthly ticks, recording transitions
    let mut pet = fresh("老黄");
    let mut transitions = Vec::new();
    for _ in 0..50 {
        if let TickOutcome::Decayed {
            growth: Some(change),
            ..
        } = decay::advance(&mut pet, 30.0 * DAY, rules)
        {
            transitions.push((pet.age, change));
        }
    }
    results.push(TestResult {
        name: "growth_lifetime_transitions".into(),
        passed: transitions.len() == 3 && pet.growth_stage() == GrowthStage::Senior,
        detail: format!("{} transitions over {:.0} days", transitions.len(), pet.age),
    });

    if verbose {
        for (age, change) in &transitions {
            println!(
                "  day {:>6.0}: {} → {}",
                age,
                change.from.label(),
                change.to.label()
            );
        }
    }
    results
}

// ── 5. Actions ──────────────────────────────────────────────────────────

fn validate_actions(rules: &Ruleset) -> Vec<TestResult> {
    println!("--- Actions & Training ---");
    let mut results = Vec::new();
    let resolve = pawtime_logic::actions::resolve;

    let mut pet = fresh("小饭");
    pet.attributes_mut().set(Attribute::Hunger, 50.0);
    pet.attributes_mut().set(Attribute::Happiness, 50.0);
    pet.attributes_mut().set(Attribute::Health, 50.0);
    pet.attributes_mut().set(Attribute::Energy, 50.0);
    resolve(&mut pet, Action::Feed(Food::from_name("普通狗粮")), rules, &mut StepRng::new(0, 0));
    let a = *pet.attributes();
    results.push(TestResult {
        name: "feed_regular_kibble".into(),
        passed: a.hunger() == 70.0
            && a.happiness() == 55.0
            && a.health() == 55.0
            && a.energy() == 45.0
            && pet.experience == 10.0,
        detail: format!(
            "hunger {} happiness {} health {} energy {} exp {}",
            a.hunger(), a.happiness(), a.health(), a.energy(), pet.experience
        ),
    });

    let mut full = fresh("饱饱");
    let before = full.clone();
    let report = resolve(&mut full, Action::Feed(Food::Beef), rules, &mut StepRng::new(0, 0));
    results.push(TestResult {
        name: "refusal_leaves_state".into(),
        passed: report.outcome == Outcome::Refused(Refusal::AlreadyFull) && full == before,
        detail: report.message,
    });

    let mut lucky = fresh("学霸");
    let win = resolve(&mut lucky, Action::Train(skills::SIT.into()), rules, &mut StepRng::new(0, 0));
    let mut unlucky = fresh("学渣");
    let lose = resolve(
        &mut unlucky,
        Action::Train(skills::SIT.into()),
        rules,
        &mut StepRng::new(u64::MAX, 0),
    );
    results.push(TestResult {
        name: "train_fixed_draws".into(),
        passed: lucky.skills.level(skills::SIT) == 1
            && unlucky.skills.is_empty()
            && lucky.attributes().energy() < unlucky.attributes().energy(),
        detail: format!("success: {} / failure: {}", win.message, lose.message),
    });

    let cfg = &rules.config.training;
    let decreasing =
        (1..MAX_SKILL_LEVEL - 1).all(|l| success_chance(l + 1, 1, cfg) < success_chance(l, 1, cfg));
    results.push(TestResult {
        name: "train_odds_decrease".into(),
        passed: decreasing,
        detail: (1..MAX_SKILL_LEVEL)
            .map(|l| format!("L{l}={:.2}", success_chance(l, 1, cfg)))
            .collect::<Vec<_>>()
            .join(" "),
    });

    results
}

// ── 6. Sleep ────────────────────────────────────────────────────────────

fn validate_sleep_cycle(rules: &Ruleset) -> Vec<TestResult> {
    println!("--- Sleep Cycle ---");
    let mut results = Vec::new();

    let engine = PetEngine::new(
        rules.clone(),
        Box::new(MemoryPetRepository::new()),
        StepRng::new(0, 0),
    );
    let outcome = (|| -> pawtime_core::error::Result<(bool, bool, Mood, f64)> {
        engine.adopt("困困", "柯基", "活泼", 0.0)?;
        engine.act("困困", Action::Play(Game::TugOfWar), 0.0)?;
        engine.act("困困", Action::Play(Game::TugOfWar), 0.0)?;
        let asleep = engine
            .act("困困", Action::Sleep { hours: 8.0 }, 0.0)?
            .is_applied();
        let mid = engine.status("困困", 0.0)?.mood;
        engine.tick("困困", 4.0 * 3600.0)?;
        let still = engine.snapshot("困困", 4.0 * 3600.0)?.is_sleeping;
        engine.tick("困困", 8.0 * 3600.0 + 1.0)?;
        let energy = engine.snapshot("困困", 8.0 * 3600.0 + 1.0)?.attributes().energy();
        Ok((asleep, still, mid, energy))
    })();

    match outcome {
        Ok((asleep, still, mood, energy)) => results.push(TestResult {
            name: "sleep_wake_cycle".into(),
            passed: asleep && still && mood == Mood::Sleeping && energy == 100.0,
            detail: format!("slept={asleep} mid-sleep={still} energy after wake {energy}"),
        }),
        Err(e) => results.push(TestResult {
            name: "sleep_wake_cycle".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    results
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(rules: &Ruleset, seed: u64) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pet = fresh("存档");
    for _ in 0..300 {
        decay::advance(&mut pet, rng.gen_range(0.0..2.0 * DAY), rules);
        let action = random_action(&mut rng);
        pawtime_logic::actions::resolve(&mut pet, action, rules, &mut rng);
    }

    for format in [Format::Json, Format::Binary] {
        let round_trip = persistence::to_bytes(&encode(&pet), format)
            .and_then(|bytes| {
                let size = bytes.len();
                persistence::from_bytes(&bytes, format).map(|r| (r, size))
            })
            .map(|(record, size)| (decode(record, &rules.config.growth, 0.0), size));
        let (passed, detail) = match round_trip {
            Ok(((back, fixes), size)) => (
                back == pet && fixes.is_empty(),
                format!("{size} bytes, {} corrections", fixes.len()),
            ),
            Err(e) => (false, e.to_string()),
        };
        results.push(TestResult {
            name: format!("persist_round_trip_{}", format.extension()),
            passed,
            detail,
        });
    }

    let repo = MemoryPetRepository::new();
    let adopted = pawtime_core::repository::load_or_adopt(&repo, "新来的", rules, 0.0);
    results.push(TestResult {
        name: "persist_missing_adopts_default".into(),
        passed: adopted.name == "新来的" && adopted.level == 1,
        detail: format!("{} the {}", adopted.name, adopted.breed),
    });

    results
}

// ── 8. A week with the engine ───────────────────────────────────────────

fn simulate_week(rules: &Ruleset, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- One Week of Care ---");
    let mut results = Vec::new();

    let engine = PetEngine::new(
        rules.clone(),
        Box::new(MemoryPetRepository::new()),
        StdRng::seed_from_u64(seed),
    );
    let household = [("旺财", "柯基", "活泼"), ("阿黄", "哈士奇", "独立"), ("小黑", "金毛", "粘人")];
    let names = household.map(|(name, _, _)| name);
    for (name, breed, personality) in household {
        if let Err(e) = engine.adopt(name, breed, personality, 0.0) {
            results.push(TestResult {
                name: "week_adopt".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    }

    // Morning and evening routine, one game day apart
    let routine = [
        Action::Feed(Food::Premium),
        Action::Play(Game::Frisbee),
        Action::Bath,
        Action::Train(skills::SHAKE.into()),
        Action::Pet,
        Action::Feed(Food::Chicken),
    ];
    let mut errors = 0;
    let mut now = 0.0;
    for _day in 0..7 {
        now += DAY;
        for name in names {
            for action in routine.iter().cloned() {
                if engine.act(name, action, now).is_err() {
                    errors += 1;
                }
            }
            let reward = MinigameReward {
                game: Minigame::Fetch,
                score: 8,
            };
            if engine.reward(name, reward, now).is_err() {
                errors += 1;
            }
        }
        errors += engine.tick_all(now).iter().filter(|(_, r)| r.is_err()).count();
    }

    let statuses: Vec<_> = names.iter().filter_map(|n| engine.status(n, now).ok()).collect();
    results.push(TestResult {
        name: "week_no_errors".into(),
        passed: errors == 0 && statuses.len() == names.len(),
        detail: format!("{errors} errors"),
    });
    results.push(TestResult {
        name: "week_pets_thrive".into(),
        passed: statuses
            .iter()
            .all(|s| s.level > 1 && s.skills.contains_key(skills::CATCH_FRISBEE)),
        detail: statuses
            .iter()
            .map(|s| format!("{} L{}", s.name, s.level))
            .collect::<Vec<_>>()
            .join(", "),
    });

    if verbose {
        for s in &statuses {
            println!(
                "  {} [{}] L{} {} affection {:.0} skills {:?}",
                s.name,
                s.growth_stage.label(),
                s.level,
                s.mood.label(),
                s.affection,
                s.skills
            );
        }
        if let Some(first) = statuses.first() {
            match serde_json::to_string_pretty(first) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("  status not serializable: {e}"),
            }
        }
    }
    results
}
