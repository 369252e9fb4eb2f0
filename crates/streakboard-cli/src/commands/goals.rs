//! Goal list commands.

use clap::Subcommand;
use streakboard_core::GoalDraft;

use super::{current_user, open_tracker, print_json, CommandResult};

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List goals in order
    List,
    /// Replace the whole goal list
    ///
    /// Goals keep the order given. Prefix an existing goal with its id
    /// (`12:Drink water`) to keep its history; goals left out are deleted
    /// along with their progress.
    Set {
        #[arg(long = "goal", value_parser = parse_goal)]
        goals: Vec<GoalDraft>,
    },
}

/// Parse `[id:]text`. A prefix that is not an integer is part of the text.
fn parse_goal(raw: &str) -> Result<GoalDraft, String> {
    match raw.split_once(':') {
        Some((id, text)) => match id.trim().parse::<i64>() {
            Ok(id) => Ok(GoalDraft::existing(id, text)),
            Err(_) => Ok(GoalDraft::new(raw)),
        },
        None => Ok(GoalDraft::new(raw)),
    }
}

pub fn run(action: GoalsAction) -> CommandResult {
    let tracker = open_tracker()?;
    let user = current_user(&tracker)?;
    match action {
        GoalsAction::List => {
            print_json(&tracker.goals(user.id)?)?;
        }
        GoalsAction::Set { goals } => {
            let saved = tracker.replace_goals(user.id, &goals)?;
            println!("Goals saved: {}", saved.len());
            print_json(&saved)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_id_prefix() {
        let draft = parse_goal("12:Drink water").unwrap();
        assert_eq!(draft.id, Some(12));
        assert_eq!(draft.text, "Drink water");
    }

    #[test]
    fn non_numeric_prefix_stays_in_text() {
        let draft = parse_goal("Read: 10 pages").unwrap();
        assert_eq!(draft.id, None);
        assert_eq!(draft.text, "Read: 10 pages");

        let plain = parse_goal("Walk").unwrap();
        assert_eq!(plain, GoalDraft::new("Walk"));
    }
}
