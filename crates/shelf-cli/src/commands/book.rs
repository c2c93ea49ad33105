//! Search and library command handlers

use anyhow::{bail, Result};

use shelf_core::{Backend, LibraryContext};

use crate::output::Output;

/// Search the public catalog
pub fn search<B: Backend>(ctx: &mut LibraryContext<B>, query: &str, output: &Output) -> Result<()> {
    if !ctx.search_catalog(query) {
        bail!("Catalog search failed. Run with SHELF_LOG=debug for details.");
    }
    output.print_books(ctx.books());
    Ok(())
}

/// List or search the personal library
pub fn library<B: Backend>(
    ctx: &mut LibraryContext<B>,
    query: Option<String>,
    output: &Output,
) -> Result<()> {
    require_login(ctx)?;
    if !ctx.search_personal_library(query.as_deref().unwrap_or_default()) {
        bail!("Library search failed. Run with SHELF_LOG=debug for details.");
    }
    output.print_books(ctx.books());
    Ok(())
}

/// Add a catalog book, found by searching for `query`, to the library
pub fn add<B: Backend>(
    ctx: &mut LibraryContext<B>,
    query: &str,
    key: &str,
    output: &Output,
) -> Result<()> {
    require_login(ctx)?;
    if !ctx.search_catalog(query) {
        bail!("Catalog search failed. Run with SHELF_LOG=debug for details.");
    }
    let Some(index) = ctx.books().position_of_key(key) else {
        bail!("No book with key '{}' in catalog results for '{}'", key, query);
    };

    let title = title_at(ctx, index);
    if ctx.books().get(index).is_some_and(|book| book.is_member) {
        output.message(&format!("'{}' is already in your library", title));
        return Ok(());
    }
    if ctx.toggle_membership(index) != Some(true) {
        bail!("Failed to add '{}' to your library", title);
    }

    output.success(&format!("Added '{}' to your library", title));
    Ok(())
}

/// Remove a book from the library by key
pub fn remove<B: Backend>(ctx: &mut LibraryContext<B>, key: &str, output: &Output) -> Result<()> {
    require_login(ctx)?;
    if !ctx.search_personal_library("") {
        bail!("Library search failed. Run with SHELF_LOG=debug for details.");
    }
    let Some(index) = ctx.books().position_of_key(key) else {
        bail!("No book with key '{}' in your library", key);
    };

    let title = title_at(ctx, index);
    if ctx.toggle_membership(index) != Some(true) {
        bail!("Failed to remove '{}' from your library", title);
    }

    output.success(&format!("Removed '{}' from your library", title));
    Ok(())
}

fn require_login<B: Backend>(ctx: &LibraryContext<B>) -> Result<()> {
    if !ctx.session().is_authenticated() {
        bail!("Not logged in. Run `shelf login <username>` first.");
    }
    Ok(())
}

fn title_at<B: Backend>(ctx: &LibraryContext<B>, index: usize) -> String {
    ctx.books()
        .get(index)
        .map(|book| book.entry.title().to_string())
        .unwrap_or_default()
}
