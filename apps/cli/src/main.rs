#![deny(warnings)]

//! Interactive line-based frontend for Stagelight.
//!
//! Reads one menu choice per turn, applies the chosen action, rolls the
//! per-turn random event, advances the clock, and stops on a terminal
//! verdict. `--seed <u64>` replays a session; `--role ceo|trainee` skips the
//! opening prompt.

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sim_core::{validate_session, Company, Role};
use sim_runtime::{
    apply_ceo_action, apply_trainee_action, new_game_ceo, new_game_trainee, random_event,
    CeoAction, GameState, TraineeAction, CEO_MENU, TRAINEE_MENU,
};
use std::io::{self, Write};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn parse_args() -> (Option<u64>, Option<String>) {
    let mut seed: Option<u64> = None;
    let mut role: Option<String> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => seed = it.next().and_then(|s| s.parse().ok()),
            "--role" => role = it.next(),
            _ => {}
        }
    }
    (seed, role)
}

/// One line from stdin, trimmed. `None` means end-of-input: the player left.
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    if io::stdin().read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

/// Free-text prompt with a fallback default for empty input.
fn prompt_text(prompt: &str, default: &str) -> io::Result<Option<String>> {
    Ok(read_line(prompt)?.map(|s| if s.is_empty() { default.to_string() } else { s }))
}

/// Numeric prompt, re-asking until the input parses and lands in range.
fn prompt_int(prompt: &str, min: i32, max: i32) -> io::Result<Option<i32>> {
    loop {
        let Some(line) = read_line(prompt)? else {
            return Ok(None);
        };
        match line.parse::<i32>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(Some(value)),
            Ok(_) => println!("Enter a value between {min} and {max}."),
            Err(_) => println!("Please enter a number."),
        }
    }
}

/// Comma-separated roster picks; bad tokens and out-of-range numbers are
/// dropped rather than rejected.
fn parse_picks(input: &str, len: usize) -> Vec<usize> {
    input
        .split(',')
        .filter_map(|p| p.trim().parse::<usize>().ok())
        .filter(|&i| i >= 1 && i <= len)
        .collect()
}

/// What a menu choice resolved to after sub-prompts.
enum ActionPrompt {
    Ceo(CeoAction),
    Trainee(TraineeAction),
    /// The turn resolves to a message with no dispatch (empty roster etc.).
    Note(String),
    /// End-of-input mid-prompt.
    Quit,
}

fn build_ceo_action(company: &Company, choice: usize) -> io::Result<ActionPrompt> {
    match choice {
        1 => {
            let default = format!("Trainee{}", company.trainees.len() + 1);
            let Some(name) = prompt_text("Enter new trainee name: ", &default)? else {
                return Ok(ActionPrompt::Quit);
            };
            Ok(ActionPrompt::Ceo(CeoAction::Recruit { name }))
        }
        2 => {
            if company.trainees.is_empty() {
                return Ok(ActionPrompt::Note("No trainees available.".to_string()));
            }
            for (idx, t) in company.trainees.iter().enumerate() {
                println!("{}) {} (Sta {})", idx + 1, t.name, t.stamina);
            }
            let Some(pick) = prompt_int("Choose trainee: ", 1, company.trainees.len() as i32)?
            else {
                return Ok(ActionPrompt::Quit);
            };
            let trainee = company.trainees[pick as usize - 1].id;
            let Some(focus) = prompt_text("Focus (vocal/dance/rap/visual/charisma): ", "vocal")?
            else {
                return Ok(ActionPrompt::Quit);
            };
            Ok(ActionPrompt::Ceo(CeoAction::Training { trainee, focus }))
        }
        3 => {
            if company.trainees.is_empty() {
                return Ok(ActionPrompt::Note(
                    "You need at least one trainee to debut.".to_string(),
                ));
            }
            println!("Select trainees by number, separated by commas (e.g., 1,2):");
            for (idx, t) in company.trainees.iter().enumerate() {
                println!("{}) {}", idx + 1, t.name);
            }
            let Some(picks) = read_line("Your picks: ")? else {
                return Ok(ActionPrompt::Quit);
            };
            let names: Vec<String> = parse_picks(&picks, company.trainees.len())
                .into_iter()
                .map(|i| company.trainees[i - 1].name.clone())
                .collect();
            let Some(concept) = prompt_text("Concept (Fresh/Dark/Retro): ", "Fresh")? else {
                return Ok(ActionPrompt::Quit);
            };
            let Some(budget) = prompt_int("Budget (100-2000): ", 100, 2000)? else {
                return Ok(ActionPrompt::Quit);
            };
            Ok(ActionPrompt::Ceo(CeoAction::PlanDebut { names, concept, budget }))
        }
        4 => {
            if company.groups.is_empty() {
                return Ok(ActionPrompt::Note("No groups have debuted yet.".to_string()));
            }
            for (idx, g) in company.groups.iter().enumerate() {
                println!("{}) {} (Pop {})", idx + 1, g.name, g.popularity);
            }
            let Some(pick) = prompt_int("Choose group: ", 1, company.groups.len() as i32)? else {
                return Ok(ActionPrompt::Quit);
            };
            let Some(title) = prompt_text("Song/Album title: ", "Untitled")? else {
                return Ok(ActionPrompt::Quit);
            };
            let Some(budget) = prompt_int("Production budget (100-3000): ", 100, 3000)? else {
                return Ok(ActionPrompt::Quit);
            };
            Ok(ActionPrompt::Ceo(CeoAction::ReleaseSong {
                group: pick as usize - 1,
                title,
                budget,
            }))
        }
        5 => {
            if company.groups.is_empty() {
                return Ok(ActionPrompt::Note("No groups to promote.".to_string()));
            }
            for (idx, g) in company.groups.iter().enumerate() {
                println!("{}) {} (Pop {})", idx + 1, g.name, g.popularity);
            }
            let Some(pick) = prompt_int("Choose group: ", 1, company.groups.len() as i32)? else {
                return Ok(ActionPrompt::Quit);
            };
            let Some(budget) = prompt_int("Promotion budget (50-1500): ", 50, 1500)? else {
                return Ok(ActionPrompt::Quit);
            };
            Ok(ActionPrompt::Ceo(CeoAction::Promote {
                group: pick as usize - 1,
                budget,
            }))
        }
        6 => Ok(ActionPrompt::Ceo(CeoAction::ReviewFinances)),
        _ => Ok(ActionPrompt::Ceo(CeoAction::Rest)),
    }
}

fn build_trainee_action(choice: usize) -> io::Result<ActionPrompt> {
    match choice {
        1 => {
            let Some(focus) = prompt_text("Focus (vocal/dance/rap/visual/charisma): ", "dance")?
            else {
                return Ok(ActionPrompt::Quit);
            };
            Ok(ActionPrompt::Trainee(TraineeAction::Train { focus }))
        }
        2 => Ok(ActionPrompt::Trainee(TraineeAction::Rest)),
        3 => Ok(ActionPrompt::Trainee(TraineeAction::Socialize)),
        4 => Ok(ActionPrompt::Trainee(TraineeAction::Audition)),
        5 => Ok(ActionPrompt::Trainee(TraineeAction::ViewStats)),
        _ => Ok(ActionPrompt::Trainee(TraineeAction::Idle)),
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Ceo => "CEO",
        Role::Trainee(_) => "Trainee",
    }
}

fn render_status(state: &GameState) {
    println!("\n{}", "-".repeat(50));
    println!("Day {}, Month {}, Year {}", state.day, state.month, state.year);
    println!(
        "Player: {} ({})",
        state.player.name,
        role_label(state.player.role)
    );
    println!(
        "Company Money: {} | Reputation: {}",
        state.company.money, state.company.reputation
    );
    match state.player.role {
        Role::Trainee(_) => {
            if let Some(t) = state.player_trainee() {
                println!(
                    "You - Sta:{} Vocal:{} Dance:{} Rap:{} Charisma:{} Pop:{} Rel:{}",
                    t.stamina, t.vocal, t.dance, t.rap, t.charisma, t.popularity, t.relationship
                );
            }
        }
        Role::Ceo => {
            let roster = state
                .company
                .trainees
                .iter()
                .map(|t| format!("{} Pop:{} Sta:{}", t.name, t.popularity, t.stamina))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "Trainees: {}",
                if roster.is_empty() { "None" } else { roster.as_str() }
            );
            if !state.company.groups.is_empty() {
                let groups = state
                    .company
                    .groups
                    .iter()
                    .map(|g| format!("{} Pop:{}", g.name, g.popularity))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("Groups: {groups}");
            }
        }
    }
    if !state.message_log.is_empty() {
        println!("Recent events:");
        for msg in state.recent_messages(3) {
            println!(" * {msg}");
        }
    }
    println!("{}", "-".repeat(50));
}

fn farewell() -> Result<()> {
    println!("\nExiting game. See you next time!");
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (seed_arg, role_arg) = parse_args();
    let seed = seed_arg.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, git_sha = env!("GIT_SHA"), "starting stagelight");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    println!("Welcome to Stagelight: a K-pop management & trainee-life sim!\n");

    let Some(name) = prompt_text("Enter your name (or stage name): ", "Player")? else {
        return farewell();
    };

    let ceo = match role_arg.as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("ceo") => true,
        Some("trainee") => false,
        _ => {
            println!("Choose your path:");
            println!("1) CEO - Run the company");
            println!("2) Trainee - Fight to debut");
            match prompt_int("Select 1 or 2: ", 1, 2)? {
                Some(choice) => choice == 1,
                None => return farewell(),
            }
        }
    };

    let mut state = if ceo {
        new_game_ceo(&name, &mut rng)
    } else {
        new_game_trainee(&name, &mut rng)
    };
    validate_session(&state.player, &state.company)?;

    loop {
        render_status(&state);
        let menu: &[&str] = match state.player.role {
            Role::Ceo => &CEO_MENU,
            Role::Trainee(_) => &TRAINEE_MENU,
        };
        for (idx, label) in menu.iter().enumerate() {
            println!("{}) {label}", idx + 1);
        }
        let Some(choice) = prompt_int("Choose an action: ", 1, menu.len() as i32)? else {
            return farewell();
        };

        let prompted = match state.player.role {
            Role::Ceo => build_ceo_action(&state.company, choice as usize)?,
            Role::Trainee(_) => build_trainee_action(choice as usize)?,
        };
        let result = match prompted {
            ActionPrompt::Quit => return farewell(),
            ActionPrompt::Note(message) => message,
            ActionPrompt::Ceo(action) => apply_ceo_action(&mut state, action, &mut rng),
            ActionPrompt::Trainee(action) => apply_trainee_action(&mut state, action, &mut rng),
        };
        println!("{result}");
        state.push_message(result);

        if let Some(event) = random_event(&mut state, &mut rng) {
            println!("{event}");
            state.push_message(event);
        }

        state.advance_day(&mut rng);
        if let Some(ending) = state.check_victory_or_defeat() {
            println!("\n{}", "#".repeat(40));
            println!("{}", ending.message);
            println!("Thanks for playing!");
            info!(kind = ?ending.kind, "session over");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_drop_garbage_and_out_of_range() {
        assert_eq!(parse_picks("1, 2", 5), vec![1, 2]);
        assert_eq!(parse_picks("2,junk, 9 ,0,3", 5), vec![2, 3]);
        assert!(parse_picks("", 5).is_empty());
        assert!(parse_picks("junk", 0).is_empty());
    }
}
