use super::{current_user, open_tracker, print_json, CommandResult};

pub fn run() -> CommandResult {
    let tracker = open_tracker()?;
    current_user(&tracker)?;
    print_json(&tracker.scoreboard()?)?;
    Ok(())
}
