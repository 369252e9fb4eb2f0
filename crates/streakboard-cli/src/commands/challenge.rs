use chrono::NaiveDate;
use clap::Subcommand;

use super::{current_user, open_tracker, print_json, CommandResult};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Show the challenge window and today's day number
    Show,
    /// Move the challenge start date
    SetStart {
        /// Date as YYYY-MM-DD
        date: NaiveDate,
    },
    /// Resume counting days
    Activate,
    /// Pause the challenge; the current day reads as 0
    Deactivate,
}

pub fn run(action: ChallengeAction) -> CommandResult {
    let tracker = open_tracker()?;
    current_user(&tracker)?;
    let status = match action {
        ChallengeAction::Show => tracker.challenge_status()?,
        ChallengeAction::SetStart { date } => tracker.set_start_date(date)?,
        ChallengeAction::Activate => tracker.set_active(true)?,
        ChallengeAction::Deactivate => tracker.set_active(false)?,
    };
    print_json(&status)?;
    Ok(())
}
