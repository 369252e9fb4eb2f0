//! Registration, sessions and account deletion.

use clap::Subcommand;

use super::{current_user, open_tracker, print_json, CommandResult, SESSION_KEY};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Delete the logged-in account with its goals and progress
    Delete,
}

pub fn register(username: &str, password: &str) -> CommandResult {
    let tracker = open_tracker()?;
    let user = tracker.register(username, password)?;
    println!("Registered: {}", user.username);
    print_json(&tracker.goals(user.id)?)?;
    Ok(())
}

pub fn login(username: &str, password: &str) -> CommandResult {
    let tracker = open_tracker()?;
    let session = tracker.login(username, password)?;
    tracker.db().kv_set(SESSION_KEY, &session.token)?;
    println!("Logged in as {username} until {}", session.expires_at.to_rfc3339());
    Ok(())
}

pub fn logout() -> CommandResult {
    let tracker = open_tracker()?;
    if let Some(token) = tracker.db().kv_get(SESSION_KEY)? {
        tracker.logout(&token)?;
        tracker.db().kv_delete(SESSION_KEY)?;
    }
    println!("Logged out");
    Ok(())
}

pub fn whoami() -> CommandResult {
    let tracker = open_tracker()?;
    let user = current_user(&tracker)?;
    print_json(&user)?;
    Ok(())
}

pub fn run(action: AccountAction) -> CommandResult {
    let tracker = open_tracker()?;
    match action {
        AccountAction::Delete => {
            let user = current_user(&tracker)?;
            tracker.delete_account(user.id)?;
            tracker.db().kv_delete(SESSION_KEY)?;
            println!("Account deleted: {}", user.username);
        }
    }
    Ok(())
}
