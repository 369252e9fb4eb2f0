use super::{current_user, open_tracker, print_json, CommandResult};

pub fn run(goal_id: i64, day: Option<i64>) -> CommandResult {
    let tracker = open_tracker()?;
    let user = current_user(&tracker)?;
    print_json(&tracker.toggle(user.id, goal_id, day)?)?;
    Ok(())
}
