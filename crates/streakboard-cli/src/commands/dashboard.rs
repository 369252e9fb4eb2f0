use super::{current_user, open_tracker, print_json, CommandResult};

pub fn run(day: Option<i64>) -> CommandResult {
    let tracker = open_tracker()?;
    let user = current_user(&tracker)?;
    print_json(&tracker.dashboard(user.id, day)?)?;
    Ok(())
}
