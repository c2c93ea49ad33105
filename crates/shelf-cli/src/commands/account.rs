//! Login, registration and session command handlers

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use shelf_core::{AuthOutcome, Backend, LibraryContext};

use crate::output::Output;

pub fn login<B: Backend>(
    ctx: &mut LibraryContext<B>,
    username: &str,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let outcome = ctx.login(username, &password);
    report(&outcome, "Logged in as", "Login", output)?;
    if !output.is_quiet() && !output.is_json() {
        output.message(&format!("{} book(s) in your library", ctx.membership().len()));
    }
    Ok(())
}

pub fn register<B: Backend>(
    ctx: &mut LibraryContext<B>,
    username: &str,
    password: Option<String>,
    output: &Output,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let outcome = ctx.register(username, &password);
    report(&outcome, "Registered as", "Registration", output)
}

/// Forget the saved login
pub fn logout<B: Backend>(ctx: &mut LibraryContext<B>, output: &Output) -> Result<()> {
    ctx.logout();
    output.success("Logged out");
    Ok(())
}

pub fn whoami<B: Backend>(ctx: &LibraryContext<B>, output: &Output) -> Result<()> {
    output.print_session(ctx.session(), ctx.membership().len());
    Ok(())
}

fn report(outcome: &AuthOutcome, done: &str, action: &str, output: &Output) -> Result<()> {
    match outcome {
        AuthOutcome::Success {
            username, message, ..
        } => {
            output.success(&format!("{} {}", done, username));
            if let Some(message) = message {
                output.message(message);
            }
            Ok(())
        }
        AuthOutcome::Failure => bail!(
            "{} failed. Check your username and password, or whether the backend is reachable.",
            action
        ),
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => read_password(&mut io::stdin().lock()),
    }
}

fn read_password(input: &mut impl BufRead) -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password cannot be empty");
    }
    Ok(password)
}
