#![deny(warnings)]

//! Turn loop for Stagelight: the calendar, role actions, company operations,
//! random events, and the terminal win/loss predicates.
//!
//! The frontend drives one turn at a time: apply the chosen action, roll the
//! once-per-turn random event, advance the clock (which may fire the monthly
//! evaluation), then test for an ending. All randomness flows through the
//! caller's [`rand::Rng`], so a seeded generator replays a session exactly.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{
    Company, Group, Player, Role, SongProject, Trainee, TraineeId, DEFAULT_TRAIN_INTENSITY,
};
use sim_econ::{RECRUIT_COST, TRAINING_COST};
use tracing::debug;

/// Days per in-game month.
pub const DAYS_PER_MONTH: u32 = 30;
/// Months per in-game year.
pub const MONTHS_PER_YEAR: u32 = 12;
/// Last year of the run; past this the industry delivers its verdict.
pub const FINAL_YEAR: u32 = 5;

/// Group popularity needed for the CEO chart-topper win.
pub const GROUP_POP_WIN: i32 = 300;
/// Money floor below which the company goes bankrupt.
pub const BANKRUPTCY_FLOOR: i64 = -2000;
/// Reputation bar for the timeout verdict in CEO mode.
pub const REPUTATION_BAR: i32 = 80;
/// Popularity and score needed for the trainee sensation win.
pub const SENSATION_POP: i32 = 200;
pub const SENSATION_SCORE: i32 = 350;
/// Failed evaluations before a trainee is cut.
pub const MAX_FAILURES: u32 = 3;
/// Popularity bar for the trainee timeout verdict.
pub const LATE_BLOOM_POP: i32 = 150;

/// Default company name for new games.
pub const COMPANY_NAME: &str = "Stagelight Entertainment";
/// Pool the starting roster is drawn from.
pub const STARTER_NAMES: [&str; 5] = ["Ara", "Min", "Jisu", "Luna", "Kai"];

/// Whole session state: clock, player, company, and the running log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Day of month, 1..=30.
    pub day: u32,
    /// Month of year, 1..=12.
    pub month: u32,
    /// Year, starting at 1.
    pub year: u32,
    pub player: Player,
    pub company: Company,
    /// Failed evaluations so far (trainee mode).
    pub trainee_failures: u32,
    /// Ordered event log; the frontend renders the tail.
    pub message_log: Vec<String>,
}

impl GameState {
    pub fn new(player: Player, company: Company) -> Self {
        Self {
            day: 1,
            month: 1,
            year: 1,
            player,
            company,
            trainee_failures: 0,
            message_log: Vec::new(),
        }
    }

    /// The player's own trainee, when playing in trainee mode.
    pub fn player_trainee(&self) -> Option<&Trainee> {
        match self.player.role {
            Role::Trainee(id) => self.company.trainee(id),
            Role::Ceo => None,
        }
    }

    pub fn push_message(&mut self, message: String) {
        self.message_log.push(message);
    }

    /// The most recent `n` log messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[String] {
        let start = self.message_log.len().saturating_sub(n);
        &self.message_log[start..]
    }

    /// Advance the clock one day.
    ///
    /// Day 31 rolls over to day 1 of the next month; month 13 rolls over to
    /// month 1 of the next year. Every month rollover fires the monthly
    /// evaluation and appends its message to the log.
    pub fn advance_day<R: Rng>(&mut self, rng: &mut R) {
        self.day += 1;
        if self.day > DAYS_PER_MONTH {
            self.day = 1;
            self.month += 1;
            if self.month > MONTHS_PER_YEAR {
                self.month = 1;
                self.year += 1;
            }
            debug!(month = self.month, year = self.year, "month rolled over");
            let message = self.monthly_evaluation(rng);
            self.message_log.push(message);
        }
    }

    /// Periodic threshold check, fired once per month rollover.
    pub fn monthly_evaluation<R: Rng>(&mut self, rng: &mut R) -> String {
        match self.player.role {
            Role::Trainee(id) => {
                let threshold = sim_econ::evaluation_threshold(self.year);
                let Some(trainee) = self.company.trainee_mut(id) else {
                    return "The month rolls by without major events.".to_string();
                };
                let score = trainee.score() + trainee.popularity;
                if score >= threshold {
                    trainee.adjust_relationship(5);
                    trainee.adjust_popularity(5);
                    format!("Monthly evaluation passed! Score {score} / {threshold}. Relationship +5.")
                } else {
                    self.trainee_failures += 1;
                    let penalty = rng.gen_range(5..=10);
                    trainee.adjust_relationship(-penalty);
                    format!("Evaluation failed. Score {score} / {threshold}. Relationship -{penalty}.")
                }
            }
            Role::Ceo => {
                let income =
                    sim_econ::monthly_income(self.company.groups.iter().map(|g| g.popularity));
                self.company.update_finances(income);
                format!("Monthly income report: earned {income} from active groups.")
            }
        }
    }

    /// Terminal predicate, evaluated once per turn after the clock advances.
    ///
    /// Pure: no mutation. Conditions are tested in priority order, so the
    /// earliest listed one wins when several hold at once.
    pub fn check_victory_or_defeat(&self) -> Option<Ending> {
        match self.player.role {
            Role::Ceo => {
                let company = &self.company;
                if company.money < BANKRUPTCY_FLOOR {
                    return Some(Ending::defeat(
                        "Bankruptcy! Your company could not pay its bills.",
                    ));
                }
                if company.groups.iter().any(|g| g.popularity >= GROUP_POP_WIN) {
                    return Some(Ending::victory(
                        "Success! One of your groups became a top act.",
                    ));
                }
                if self.year > FINAL_YEAR {
                    return Some(if company.reputation < REPUTATION_BAR {
                        Ending::defeat("Time's up. The industry moved on before you produced a hit.")
                    } else {
                        Ending::victory("Legendary CEO!")
                    });
                }
                None
            }
            Role::Trainee(id) => {
                let trainee = self.company.trainee(id)?;
                if trainee.popularity >= SENSATION_POP && trainee.score() >= SENSATION_SCORE {
                    return Some(Ending::victory("You debuted and became a sensation!"));
                }
                if self.trainee_failures >= MAX_FAILURES {
                    return Some(Ending::defeat(
                        "You were cut after repeated failed evaluations.",
                    ));
                }
                if self.year > FINAL_YEAR {
                    return Some(if trainee.popularity < LATE_BLOOM_POP {
                        Ending::defeat("The window closed before you could debut.")
                    } else {
                        Ending::victory("Late bloomer debut success!")
                    });
                }
                None
            }
        }
    }
}

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndingKind {
    Victory,
    Defeat,
}

/// A terminal verdict with its player-facing message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ending {
    pub kind: EndingKind,
    pub message: String,
}

impl Ending {
    fn victory(message: &str) -> Self {
        Self {
            kind: EndingKind::Victory,
            message: message.to_string(),
        }
    }

    fn defeat(message: &str) -> Self {
        Self {
            kind: EndingKind::Defeat,
            message: message.to_string(),
        }
    }
}

/// CEO-mode menu labels, in dispatch order.
pub const CEO_MENU: [&str; 7] = [
    "Recruit trainee",
    "Schedule training",
    "Plan debut",
    "Release song/album",
    "Schedule promotion",
    "Check company finances",
    "Rest / advance day",
];

/// Trainee-mode menu labels, in dispatch order.
pub const TRAINEE_MENU: [&str; 6] = [
    "Train a skill",
    "Rest to regain stamina",
    "Build relationships",
    "Participate in evaluation",
    "View personal stats",
    "Advance day",
];

/// One CEO-mode decision, fully parameterized by the frontend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CeoAction {
    Recruit { name: String },
    Training { trainee: TraineeId, focus: String },
    PlanDebut { names: Vec<String>, concept: String, budget: i32 },
    ReleaseSong { group: usize, title: String, budget: i32 },
    Promote { group: usize, budget: i32 },
    ReviewFinances,
    Rest,
}

/// One trainee-mode decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TraineeAction {
    Train { focus: String },
    Rest,
    Socialize,
    Audition,
    ViewStats,
    Idle,
}

/// Execute a CEO decision, returning the log line for the turn.
pub fn apply_ceo_action<R: Rng>(state: &mut GameState, action: CeoAction, rng: &mut R) -> String {
    let company = &mut state.company;
    match action {
        CeoAction::Recruit { name } => recruit_trainee(company, &name, rng),
        CeoAction::Training { trainee, focus } => {
            schedule_training(company, trainee, &focus, rng)
        }
        CeoAction::PlanDebut { names, concept, budget } => {
            plan_debut(company, &names, &concept, budget, rng)
        }
        CeoAction::ReleaseSong { group, title, budget } => {
            release_song(company, group, &title, budget, rng)
        }
        CeoAction::Promote { group, budget } => promote(company, group, budget, rng),
        CeoAction::ReviewFinances => {
            let roster = company
                .trainees
                .iter()
                .map(|t| format!("{} Sta:{} Pop:{}", t.name, t.stamina, t.popularity))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Money: {}, Reputation: {}. Trainees: {roster}",
                company.money, company.reputation
            )
        }
        CeoAction::Rest => "Taking a breather to plan the next move.".to_string(),
    }
}

/// Execute a trainee decision, returning the log line for the turn.
pub fn apply_trainee_action<R: Rng>(
    state: &mut GameState,
    action: TraineeAction,
    rng: &mut R,
) -> String {
    let Role::Trainee(id) = state.player.role else {
        return "No trainee data loaded.".to_string();
    };
    let year = state.year;
    let Some(trainee) = state.company.trainee_mut(id) else {
        return "No trainee data loaded.".to_string();
    };
    match action {
        TraineeAction::Train { focus } => trainee.train(&focus, DEFAULT_TRAIN_INTENSITY, rng),
        TraineeAction::Rest => trainee.rest(rng),
        TraineeAction::Socialize => {
            let gain = rng.gen_range(3..=10);
            trainee.adjust_relationship(gain);
            trainee.adjust_popularity(gain / 2);
            format!(
                "Shared practice room gossip. Relationship +{gain}, Popularity +{}.",
                gain / 2
            )
        }
        TraineeAction::Audition => {
            let score = trainee.score() + rng.gen_range(-10..=25);
            let threshold = sim_econ::audition_threshold(year);
            if score >= threshold {
                trainee.adjust_popularity(10);
                trainee.adjust_relationship(5);
                format!("Evaluation success! Score {score} / {threshold}. Popularity +10.")
            } else {
                state.trainee_failures += 1;
                trainee.adjust_relationship(-5);
                format!(
                    "Evaluation tough. Score {score} / {threshold}. Failure count {}.",
                    state.trainee_failures
                )
            }
        }
        TraineeAction::ViewStats => format!(
            "Stats - Vocal:{} Dance:{} Rap:{} Visual:{} Charisma:{} Stamina:{} Popularity:{} Relationship:{}",
            trainee.vocal,
            trainee.dance,
            trainee.rap,
            trainee.visual,
            trainee.charisma,
            trainee.stamina,
            trainee.popularity,
            trainee.relationship
        ),
        TraineeAction::Idle => "Day passes while you reflect on your dreams.".to_string(),
    }
}

/// Sign a new trainee (fixed cost, randomized vocal/dance/rap in [20, 40]).
pub fn recruit_trainee<R: Rng>(company: &mut Company, name: &str, rng: &mut R) -> String {
    if company.money < RECRUIT_COST {
        return "Not enough money to recruit a new trainee.".to_string();
    }
    company.money -= RECRUIT_COST;
    let id = company.add_trainee(name);
    if let Some(t) = company.trainee_mut(id) {
        t.vocal = rng.gen_range(20..=40);
        t.dance = rng.gen_range(20..=40);
        t.rap = rng.gen_range(20..=40);
    }
    format!("Recruited {name}! Money now {}.", company.money)
}

/// Book one training session for a roster trainee (fixed cost).
pub fn schedule_training<R: Rng>(
    company: &mut Company,
    id: TraineeId,
    focus: &str,
    rng: &mut R,
) -> String {
    if company.money < TRAINING_COST {
        return "Not enough money for training.".to_string();
    }
    match company.trainee_mut(id) {
        Some(trainee) => {
            let message = trainee.train(focus, DEFAULT_TRAIN_INTENSITY, rng);
            let name = trainee.name.clone();
            company.money -= TRAINING_COST;
            format!("Training scheduled for {name}. {message} Company money -{TRAINING_COST}.")
        }
        None => "No trainees available.".to_string(),
    }
}

/// Form a group from the named trainees and run its debut showcase.
pub fn plan_debut<R: Rng>(
    company: &mut Company,
    names: &[String],
    concept: &str,
    budget: i32,
    rng: &mut R,
) -> String {
    if company.money < budget as i64 {
        return "Not enough money to plan debut.".to_string();
    }
    let selected: Vec<TraineeId> = company
        .trainees
        .iter()
        .filter(|t| names.iter().any(|n| n == &t.name))
        .map(|t| t.id)
        .collect();
    if selected.is_empty() {
        return "No valid trainees selected.".to_string();
    }
    let mut group = Group::new(format!("Project {concept}"), selected, concept);
    company.money -= budget as i64;
    let pop_gain = debut_effect(&mut group, &mut company.trainees, budget, rng);
    company.reputation += pop_gain / 10;
    let name = group.name.clone();
    company.groups.push(group);
    format!("Debuted group {name}! Popularity +{pop_gain}. Budget -{budget}.")
}

/// Debut showcase: a fresh power reading sets the group's first popularity
/// bump; each member picks up half of it.
fn debut_effect<R: Rng>(
    group: &mut Group,
    roster: &mut [Trainee],
    budget: i32,
    rng: &mut R,
) -> i32 {
    let scores: Vec<i32> = group
        .members
        .iter()
        .filter_map(|id| roster.iter().find(|t| t.id == *id))
        .map(Trainee::score)
        .collect();
    let power = sim_econ::group_power(&scores, rng);
    let pop_gain = sim_econ::debut_pop_gain(power, budget, rng);
    group.adjust_popularity(pop_gain);
    for id in &group.members {
        if let Some(t) = roster.iter_mut().find(|t| t.id == *id) {
            t.adjust_popularity(pop_gain / 2);
        }
    }
    pop_gain
}

/// Record and release a song for a debuted group.
pub fn release_song<R: Rng>(
    company: &mut Company,
    group_idx: usize,
    title: &str,
    budget: i32,
    rng: &mut R,
) -> String {
    if company.money < budget as i64 {
        return "Not enough funds for release.".to_string();
    }
    let Some(group) = company.groups.get_mut(group_idx) else {
        return "No groups have debuted yet.".to_string();
    };
    company.projects.push(SongProject {
        title: title.to_string(),
        budget,
        concept: "Bright".to_string(),
    });
    company.money -= budget as i64;
    let scores: Vec<i32> = group
        .members
        .iter()
        .filter_map(|id| company.trainees.iter().find(|t| t.id == *id))
        .map(Trainee::score)
        .collect();
    let power = sim_econ::group_power(&scores, rng);
    let result = sim_econ::song_outcome(power, budget, rng);
    group.adjust_popularity(result);
    company.reputation += (result / 8).max(0);
    format!(
        "Released '{title}'. Result +{result} popularity for {}. Cost {budget}.",
        group.name
    )
}

/// Buy promotion time for a debuted group.
pub fn promote<R: Rng>(
    company: &mut Company,
    group_idx: usize,
    budget: i32,
    rng: &mut R,
) -> String {
    if company.money < budget as i64 {
        return "Not enough money for promotion.".to_string();
    }
    let Some(group) = company.groups.get_mut(group_idx) else {
        return "No groups to promote.".to_string();
    };
    company.money -= budget as i64;
    let gain = sim_econ::promo_gain(budget, rng);
    group.adjust_popularity(gain);
    company.reputation += gain / 3;
    format!(
        "Promotions boost {}'s popularity by {gain}. Cost {budget}.",
        group.name
    )
}

/// Index of the most popular group; the first maximum wins ties.
fn top_group_index(groups: &[Group]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, g) in groups.iter().enumerate() {
        match best {
            Some(b) if groups[b].popularity >= g.popularity => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Once-per-turn stochastic perturbation.
///
/// One uniform draw decides the branch: below 0.08 a setback, above 0.92 a
/// windfall, otherwise nothing. At most one event message per turn.
pub fn random_event<R: Rng>(state: &mut GameState, rng: &mut R) -> Option<String> {
    let roll: f64 = rng.gen();
    if roll < 0.08 {
        match state.player.role {
            Role::Ceo => {
                let loss: i64 = rng.gen_range(200..=800);
                state.company.update_finances(-loss);
                debug!(loss, "negative event");
                return Some(format!("Unexpected venue cancellation. Lost {loss} in fees."));
            }
            Role::Trainee(id) => {
                if let Some(trainee) = state.company.trainee_mut(id) {
                    let injury = rng.gen_range(5..=15);
                    trainee.stamina = (trainee.stamina - injury).max(0);
                    return Some(format!("Minor injury during rehearsal. Stamina -{injury}."));
                }
            }
        }
    }
    if roll > 0.92 {
        match state.player.role {
            Role::Ceo => {
                if !state.company.groups.is_empty() {
                    let bonus: i64 = rng.gen_range(300..=900);
                    state.company.update_finances(bonus);
                    debug!(bonus, "positive event");
                    if let Some(top) = top_group_index(&state.company.groups) {
                        if let Some(group) = state.company.groups.get_mut(top) {
                            group.adjust_popularity((bonus / 10) as i32);
                            return Some(format!(
                                "Viral moment! {} trend boosts funds by {bonus}.",
                                group.name
                            ));
                        }
                    }
                }
            }
            Role::Trainee(id) => {
                if let Some(trainee) = state.company.trainee_mut(id) {
                    let boost = rng.gen_range(8..=18);
                    trainee.adjust_popularity(boost);
                    return Some(format!("Fan edit goes viral. Popularity +{boost}."));
                }
            }
        }
    }
    None
}

/// Seed a fresh company: three starters drawn without replacement from the
/// name pool, each with a little starting popularity.
fn seed_company<R: Rng>(rng: &mut R) -> Company {
    let mut company = Company::new(COMPANY_NAME);
    let picks: Vec<&str> = STARTER_NAMES.choose_multiple(rng, 3).copied().collect();
    for name in picks {
        let id = company.add_trainee(name);
        if let Some(t) = company.trainee_mut(id) {
            t.popularity = rng.gen_range(5..=20);
        }
    }
    company
}

/// Start a CEO-mode session.
pub fn new_game_ceo<R: Rng>(player_name: &str, rng: &mut R) -> GameState {
    let company = seed_company(rng);
    GameState::new(
        Player {
            name: player_name.to_string(),
            role: Role::Ceo,
        },
        company,
    )
}

/// Start a trainee-mode session: the player's character joins the roster and
/// the role tag keeps its id.
pub fn new_game_trainee<R: Rng>(player_name: &str, rng: &mut R) -> GameState {
    let mut company = seed_company(rng);
    let id = company.add_trainee(player_name);
    if let Some(t) = company.trainee_mut(id) {
        t.vocal = 35;
        t.dance = 35;
        t.rap = 30;
        t.visual = 35;
        t.charisma = 35;
        t.stamina = 80;
    }
    GameState::new(
        Player {
            name: player_name.to_string(),
            role: Role::Trainee(id),
        },
        company,
    )
}
