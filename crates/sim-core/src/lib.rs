#![deny(warnings)]

//! Core domain models and invariants for Stagelight.
//!
//! This crate defines the serializable entities of the management sim
//! (trainees, groups, song projects, the company, and the player) with
//! clamped mutation helpers and validation functions that guarantee basic
//! invariants. Randomized mutations draw from a caller-supplied [`rand::Rng`]
//! so a seeded generator reproduces a whole session.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Upper bound for trainee stamina.
pub const STAMINA_MAX: i32 = 100;
/// Upper bound for the trainee/agency relationship meter.
pub const RELATIONSHIP_MAX: i32 = 100;

/// Unique identifier for a trainee within a company roster.
///
/// Groups and the player refer to trainees by id; the roster owns the only
/// mutable copy of each trainee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TraineeId(pub u32);

/// A trainable skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Skill {
    Vocal,
    Dance,
    Rap,
    Visual,
    Charisma,
}

impl Skill {
    /// All skills, in score-summation order.
    pub const ALL: [Skill; 5] = [
        Skill::Vocal,
        Skill::Dance,
        Skill::Rap,
        Skill::Visual,
        Skill::Charisma,
    ];

    /// Parse a free-text focus string. Unknown focuses yield `None`, which
    /// training treats as a graceful no-op rather than an error.
    pub fn parse(s: &str) -> Option<Skill> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vocal" => Some(Skill::Vocal),
            "dance" => Some(Skill::Dance),
            "rap" => Some(Skill::Rap),
            "visual" => Some(Skill::Visual),
            "charisma" => Some(Skill::Charisma),
            _ => None,
        }
    }
}

/// An agency trainee with five skill stats and a handful of bounded meters.
///
/// Skills are unbounded above. Stamina and relationship are clamped on every
/// mutation; popularity floors at zero. Trainees are never removed during a
/// session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trainee {
    /// Roster identifier.
    pub id: TraineeId,
    /// Stage name.
    pub name: String,
    pub vocal: i32,
    pub dance: i32,
    pub rap: i32,
    pub visual: i32,
    pub charisma: i32,
    /// Stamina in [0, 100].
    pub stamina: i32,
    /// Public popularity, >= 0.
    pub popularity: i32,
    /// Relationship with the agency, in [0, 100].
    pub relationship: i32,
    /// Month index the trainee joined (cosmetic).
    pub trainee_since: u32,
}

/// Default training intensity used by scheduled training sessions.
pub const DEFAULT_TRAIN_INTENSITY: i32 = 5;

impl Trainee {
    /// New trainee with baseline stats.
    pub fn new(id: TraineeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            vocal: 30,
            dance: 30,
            rap: 30,
            visual: 30,
            charisma: 30,
            stamina: 70,
            popularity: 10,
            relationship: 10,
            trainee_since: 1,
        }
    }

    /// Current value of one skill.
    pub fn skill(&self, skill: Skill) -> i32 {
        match skill {
            Skill::Vocal => self.vocal,
            Skill::Dance => self.dance,
            Skill::Rap => self.rap,
            Skill::Visual => self.visual,
            Skill::Charisma => self.charisma,
        }
    }

    /// Run one training session.
    ///
    /// The focused skill gains `uniform(intensity-2, intensity+2)`; an
    /// unrecognized focus string produces a flavor message and no skill
    /// change. Stamina always drops by `uniform(8, 12)`, floored at 0.
    /// Returns a human-readable log line.
    pub fn train<R: Rng>(&mut self, focus: &str, intensity: i32, rng: &mut R) -> String {
        let gain = rng.gen_range(intensity - 2..=intensity + 2);
        let drain = rng.gen_range(8..=12);
        self.stamina = (self.stamina - drain).max(0);
        let message = match Skill::parse(focus) {
            Some(Skill::Vocal) => {
                self.vocal += gain;
                format!("Vocal training +{gain}.")
            }
            Some(Skill::Dance) => {
                self.dance += gain;
                format!("Dance training +{gain}.")
            }
            Some(Skill::Rap) => {
                self.rap += gain;
                format!("Rap training +{gain}.")
            }
            Some(Skill::Charisma) => {
                self.charisma += gain;
                format!("Charisma workshop +{gain}.")
            }
            Some(Skill::Visual) => {
                self.visual += gain;
                format!("Visual coaching +{gain}.")
            }
            None => "Training focused on fundamentals.".to_string(),
        };
        format!("{message} Stamina -10 (approx).")
    }

    /// Recover `uniform(10, 20)` stamina, capped at [`STAMINA_MAX`].
    pub fn rest<R: Rng>(&mut self, rng: &mut R) -> String {
        let recovery = rng.gen_range(10..=20);
        self.stamina = (self.stamina + recovery).min(STAMINA_MAX);
        format!("Rested and recovered {recovery} stamina.")
    }

    /// Adjust popularity; the result never drops below zero.
    pub fn adjust_popularity(&mut self, amount: i32) {
        self.popularity = (self.popularity + amount).max(0);
    }

    /// Adjust the relationship meter, clamped to [0, 100].
    pub fn adjust_relationship(&mut self, amount: i32) {
        self.relationship = (self.relationship + amount).clamp(0, RELATIONSHIP_MAX);
    }

    /// Total skill score: the sum of the five skills. Deterministic.
    pub fn score(&self) -> i32 {
        Skill::ALL.iter().map(|&s| self.skill(s)).sum()
    }
}

/// A debuted idol group: an ordered list of roster ids plus shared state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Member ids resolved through the company roster.
    pub members: Vec<TraineeId>,
    /// Free-text concept tag, e.g. "Fresh" or "Dark".
    pub concept: String,
    /// Group popularity, >= 0. The win condition reads this.
    pub popularity: i32,
}

impl Group {
    pub fn new(name: impl Into<String>, members: Vec<TraineeId>, concept: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members,
            concept: concept.into(),
            popularity: 0,
        }
    }

    /// Adjust group popularity; the result never drops below zero.
    pub fn adjust_popularity(&mut self, amount: i32) {
        self.popularity = (self.popularity + amount).max(0);
    }
}

/// A released song or album. Append-only: never mutated after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongProject {
    pub title: String,
    /// Production budget, positive.
    pub budget: i32,
    pub concept: String,
}

/// The talent agency: finances, reputation, and the owned entity lists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// Cash on hand. May go negative; bankruptcy triggers below -2000.
    pub money: i64,
    /// Industry reputation, unbounded.
    pub reputation: i32,
    pub trainees: Vec<Trainee>,
    pub groups: Vec<Group>,
    pub projects: Vec<SongProject>,
    next_trainee_id: u32,
}

impl Company {
    /// New company with the standard starting finances.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            money: 5000,
            reputation: 10,
            trainees: Vec::new(),
            groups: Vec::new(),
            projects: Vec::new(),
            next_trainee_id: 0,
        }
    }

    /// Add a trainee with baseline stats to the roster, returning its id.
    pub fn add_trainee(&mut self, name: impl Into<String>) -> TraineeId {
        let id = TraineeId(self.next_trainee_id);
        self.next_trainee_id += 1;
        self.trainees.push(Trainee::new(id, name));
        id
    }

    /// Look up a trainee by id.
    pub fn trainee(&self, id: TraineeId) -> Option<&Trainee> {
        self.trainees.iter().find(|t| t.id == id)
    }

    /// Look up a trainee by id, mutably.
    pub fn trainee_mut(&mut self, id: TraineeId) -> Option<&mut Trainee> {
        self.trainees.iter_mut().find(|t| t.id == id)
    }

    /// Scores of a group's members, in member order. Ids that no longer
    /// resolve are skipped; validation rejects such groups up front.
    pub fn member_scores(&self, group: &Group) -> Vec<i32> {
        group
            .members
            .iter()
            .filter_map(|&id| self.trainee(id))
            .map(Trainee::score)
            .collect()
    }

    /// Unconditional additive adjustment to money (passive income and fees).
    pub fn update_finances(&mut self, amount: i64) {
        self.money += amount;
    }
}

/// Play mode, fixed for the whole session.
///
/// Dispatch happens once on this tag per operation; the `Trainee` variant
/// carries the single owned id of the player's character, which must resolve
/// into the company roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Run the company: roster, groups, finances.
    Ceo,
    /// Fight to debut as the referenced roster trainee.
    Trainee(TraineeId),
}

/// The human player.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub role: Role,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Stamina outside [0, 100].
    #[error("stamina {0} is out of range [0, 100]")]
    StaminaOutOfRange(i32),
    /// Relationship outside [0, 100].
    #[error("relationship {0} is out of range [0, 100]")]
    RelationshipOutOfRange(i32),
    /// Popularity must never be negative.
    #[error("popularity must be >= 0, got {0}")]
    NegativePopularity(i32),
    /// Names must be non-empty.
    #[error("name must not be empty")]
    EmptyName,
    /// Two roster entries share an id.
    #[error("duplicate trainee id {0}")]
    DuplicateTraineeId(u32),
    /// A group member or the player references an id missing from the roster.
    #[error("trainee id {0} not found in roster")]
    UnknownTrainee(u32),
    /// A song project must have a positive budget.
    #[error("project budget must be positive, got {0}")]
    NonPositiveBudget(i32),
}

/// Validate a single trainee's bounded meters.
pub fn validate_trainee(t: &Trainee) -> Result<(), ValidationError> {
    if t.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !(0..=STAMINA_MAX).contains(&t.stamina) {
        return Err(ValidationError::StaminaOutOfRange(t.stamina));
    }
    if !(0..=RELATIONSHIP_MAX).contains(&t.relationship) {
        return Err(ValidationError::RelationshipOutOfRange(t.relationship));
    }
    if t.popularity < 0 {
        return Err(ValidationError::NegativePopularity(t.popularity));
    }
    Ok(())
}

/// Validate the company, including cross-references from groups into the
/// roster.
pub fn validate_company(company: &Company) -> Result<(), ValidationError> {
    if company.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let mut ids: BTreeSet<TraineeId> = BTreeSet::new();
    for t in &company.trainees {
        validate_trainee(t)?;
        if !ids.insert(t.id) {
            return Err(ValidationError::DuplicateTraineeId(t.id.0));
        }
    }
    for g in &company.groups {
        if g.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if g.popularity < 0 {
            return Err(ValidationError::NegativePopularity(g.popularity));
        }
        for id in &g.members {
            if !ids.contains(id) {
                return Err(ValidationError::UnknownTrainee(id.0));
            }
        }
    }
    for p in &company.projects {
        if p.budget <= 0 {
            return Err(ValidationError::NonPositiveBudget(p.budget));
        }
    }
    Ok(())
}

/// Validate a whole session: the company plus the player's roster alias.
pub fn validate_session(player: &Player, company: &Company) -> Result<(), ValidationError> {
    if player.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    validate_company(company)?;
    if let Role::Trainee(id) = player.role {
        if company.trainee(id).is_none() {
            return Err(ValidationError::UnknownTrainee(id.0));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn trainee(id: u32, name: &str) -> Trainee {
        Trainee::new(TraineeId(id), name)
    }

    #[test]
    fn serde_roundtrip_trainee() {
        let t = trainee(7, "Luna");
        let s = serde_json::to_string(&t).unwrap();
        let back: Trainee = serde_json::from_str(&s).unwrap();
        assert_eq!(back.id, TraineeId(7));
        assert_eq!(back.name, "Luna");
        assert_eq!(back.score(), 150);
    }

    #[test]
    fn company_snapshot_roundtrip() {
        let mut company = Company::new("Stagelight Entertainment");
        let a = company.add_trainee("Ara");
        let b = company.add_trainee("Min");
        company.groups.push(Group::new("Project Fresh", vec![a, b], "Fresh"));
        company.projects.push(SongProject {
            title: "First Light".to_string(),
            budget: 500,
            concept: "Bright".to_string(),
        });
        validate_company(&company).unwrap();
        let s = serde_json::to_string_pretty(&company).unwrap();
        let mut back: Company = serde_json::from_str(&s).unwrap();
        assert_eq!(back.trainees.len(), 2);
        assert_eq!(back.groups[0].members, vec![a, b]);
        assert_eq!(back.projects.len(), 1);
        // Id allocation continues past the snapshot.
        assert_eq!(back.add_trainee("Jisu"), TraineeId(2));
    }

    #[test]
    fn train_known_focus_raises_that_skill() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut t = trainee(0, "Kai");
        let before = t.dance;
        let msg = t.train("dance", DEFAULT_TRAIN_INTENSITY, &mut rng);
        assert!(msg.starts_with("Dance training +"));
        let gain = t.dance - before;
        assert!((3..=7).contains(&gain));
        assert!(t.stamina < 70 && t.stamina >= 70 - 12);
    }

    #[test]
    fn train_unknown_focus_only_drains_stamina() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut t = trainee(0, "Kai");
        let msg = t.train("acting", DEFAULT_TRAIN_INTENSITY, &mut rng);
        assert!(msg.starts_with("Training focused on fundamentals."));
        assert_eq!(t.score(), 150);
        assert!(t.stamina < 70);
    }

    #[test]
    fn train_is_reproducible_under_a_fixed_seed() {
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let mut t = trainee(0, "Kai");
            t.train("vocal", DEFAULT_TRAIN_INTENSITY, &mut rng);
            (t.vocal, t.stamina)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn stamina_floors_at_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut t = trainee(0, "Kai");
        t.stamina = 4;
        t.train("rap", DEFAULT_TRAIN_INTENSITY, &mut rng);
        assert_eq!(t.stamina, 0);
    }

    #[test]
    fn rest_caps_at_max() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut t = trainee(0, "Kai");
        t.stamina = 95;
        t.rest(&mut rng);
        assert_eq!(t.stamina, STAMINA_MAX);
    }

    #[test]
    fn validate_rejects_dangling_group_member() {
        let mut company = Company::new("Stagelight Entertainment");
        let a = company.add_trainee("Ara");
        company
            .groups
            .push(Group::new("Project Dark", vec![a, TraineeId(99)], "Dark"));
        assert_eq!(
            validate_company(&company),
            Err(ValidationError::UnknownTrainee(99))
        );
    }

    #[test]
    fn validate_rejects_dangling_player_alias() {
        let company = Company::new("Stagelight Entertainment");
        let player = Player {
            name: "Mira".to_string(),
            role: Role::Trainee(TraineeId(0)),
        };
        assert_eq!(
            validate_session(&player, &company),
            Err(ValidationError::UnknownTrainee(0))
        );
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut company = Company::new("Stagelight Entertainment");
        company.add_trainee("Ara");
        company.trainees.push(trainee(0, "Min"));
        assert_eq!(
            validate_company(&company),
            Err(ValidationError::DuplicateTraineeId(0))
        );
    }

    proptest! {
        #[test]
        fn rest_never_decreases_and_stays_bounded(start in 0i32..=100, seed in 0u64..1000) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut t = trainee(0, "Kai");
            t.stamina = start;
            t.rest(&mut rng);
            prop_assert!(t.stamina >= start);
            prop_assert!(t.stamina <= STAMINA_MAX);
        }

        #[test]
        fn relationship_stays_in_range(start in 0i32..=100, delta in -500i32..500) {
            let mut t = trainee(0, "Kai");
            t.relationship = start;
            t.adjust_relationship(delta);
            prop_assert!((0..=RELATIONSHIP_MAX).contains(&t.relationship));
        }

        #[test]
        fn popularity_never_negative(start in 0i32..500, delta in -1000i32..1000) {
            let mut t = trainee(0, "Kai");
            t.popularity = start;
            t.adjust_popularity(delta);
            prop_assert!(t.popularity >= 0);
        }

        #[test]
        fn group_popularity_never_negative(start in 0i32..500, delta in -1000i32..1000) {
            let mut g = Group::new("Project Retro", vec![], "Retro");
            g.popularity = start;
            g.adjust_popularity(delta);
            prop_assert!(g.popularity >= 0);
        }
    }
}
