//! Synthetic interaction networks with planted echo chambers.
//!
//! Users are split into groups; most interactions stay inside a group and a
//! configurable fraction crosses over. Output is reproducible from the seed
//! regardless of how rayon schedules the work.

use crate::error::{EchoError, Result};
use csv::WriterBuilder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

const PREFIXES: &[&str] = &[
    "dark", "shadow", "light", "blue", "red", "green", "gold", "silver", "phantom", "ninja",
    "stealth", "epic", "legend", "super", "mega",
];

const SUFFIXES: &[&str] = &[
    "warrior", "hunter", "mage", "slayer", "knight", "rogue", "wizard", "assassin", "lord",
    "king", "queen", "master", "pro", "noob", "gamer",
];

/// Produces unique handles like `bluewizard417`.
pub struct UsernameGenerator {
    rng: StdRng,
    used: HashSet<String>,
}

impl UsernameGenerator {
    pub fn new(seed: u64) -> Self {
        UsernameGenerator {
            rng: StdRng::seed_from_u64(seed),
            used: HashSet::new(),
        }
    }

    pub fn next_name(&mut self) -> String {
        loop {
            let prefix = PREFIXES.choose(&mut self.rng).copied().unwrap_or("user");
            let suffix = SUFFIXES.choose(&mut self.rng).copied().unwrap_or("");
            // widen the numeric tail once the short form gets crowded
            let upper = 1000 * (1 + self.used.len() / 1000) as u32;
            let num = self.rng.gen_range(1..upper);
            let name = format!("{prefix}{suffix}{num}");
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }

    pub fn batch(&mut self, count: usize) -> Vec<String> {
        (0..count).map(|_| self.next_name()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub users: usize,
    pub interactions: usize,
    pub communities: usize,
    /// Probability that an interaction crosses community lines.
    pub cross_probability: f64,
    pub max_weight: u32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            users: 140,
            interactions: 500,
            communities: 4,
            cross_probability: 0.05,
            max_weight: 20,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<()> {
        if self.users < 2 {
            return Err(EchoError::Config("need at least two users".to_string()));
        }
        // every group needs two members for an in-group interaction
        if self.communities == 0 || self.users / self.communities < 2 {
            return Err(EchoError::Config(format!(
                "cannot split {} users into {} communities of at least two",
                self.users, self.communities
            )));
        }
        if !(0.0..=1.0).contains(&self.cross_probability) {
            return Err(EchoError::Config(
                "cross_probability must lie in [0, 1]".to_string(),
            ));
        }
        if self.max_weight == 0 {
            return Err(EchoError::Config("max_weight must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub user1: String,
    pub user2: String,
    pub weight: u32,
}

/// Picks one user from `pool` other than `not`, if the pool allows it.
fn pick_other<'a, R: Rng>(rng: &mut R, pool: &'a [String], not: &str) -> Option<&'a String> {
    if pool.iter().all(|u| u == not) {
        return None;
    }
    loop {
        let candidate = pool.choose(&mut *rng)?;
        if candidate != not {
            return Some(candidate);
        }
    }
}

pub fn generate_interactions(config: &GeneratorConfig) -> Result<Vec<Interaction>> {
    config.validate()?;

    let users = UsernameGenerator::new(config.seed).batch(config.users);
    let groups: Vec<Vec<String>> = (0..config.communities)
        .map(|g| {
            users
                .iter()
                .skip(g)
                .step_by(config.communities)
                .cloned()
                .collect()
        })
        .collect();

    let interactions = (0..config.interactions)
        .into_par_iter()
        .filter_map(|i| {
            let stream = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            let mut rng = StdRng::seed_from_u64(config.seed ^ stream);
            let home = rng.gen_range(0..groups.len());
            let user1 = groups[home].choose(&mut rng)?;

            let crosses = groups.len() > 1 && rng.gen_bool(config.cross_probability);
            let pool = if crosses {
                let mut other = rng.gen_range(0..groups.len() - 1);
                if other >= home {
                    other += 1;
                }
                &groups[other]
            } else {
                &groups[home]
            };
            let user2 = pick_other(&mut rng, pool, user1)?;

            Some(Interaction {
                user1: user1.clone(),
                user2: user2.clone(),
                weight: rng.gen_range(1..=config.max_weight),
            })
        })
        .collect::<Vec<_>>();

    info!(
        users = config.users,
        communities = config.communities,
        interactions = interactions.len(),
        "generated synthetic interactions"
    );
    Ok(interactions)
}

pub fn write_interaction_csv<P: AsRef<Path>>(path: P, interactions: &[Interaction]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    for interaction in interactions {
        writer.write_record([
            interaction.user1.as_str(),
            interaction.user2.as_str(),
            interaction.weight.to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
