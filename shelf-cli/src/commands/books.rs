//! Library commands - add, edit, remove and list books
//!
//! Positions on the command line are 1-based and always refer to the
//! stored order, the same numbers `shelf list` prints.

use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use shelf_core::{FileStorage, Library, ShelfError, SortField, SortOrder, ViewQuery};

use super::Context;
use crate::util::AppError;

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Book title
    pub title: String,
    /// Book author
    pub author: String,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Position shown by `shelf list` (1-based)
    pub position: usize,
    /// New title
    pub title: String,
    /// New author
    pub author: String,
}

#[derive(Parser, Debug)]
pub struct RemoveArgs {
    /// Position shown by `shelf list` (1-based)
    pub position: usize,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only show books whose title or author contains this text (case-insensitive)
    #[arg(long)]
    pub query: Option<String>,

    /// Sort field (default from config, else title)
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,

    /// Sort order (default from config, else asc)
    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    /// Print JSON instead of a numbered list
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Title,
    Author,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Title => SortField::Title,
            SortArg::Author => SortField::Author,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

/// JSON shape of one `shelf list --json` row
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    position: usize,
    id: String,
    title: &'a str,
    author: &'a str,
}

fn blank_fields() -> AppError {
    AppError::validation(anyhow!("Title and author must both be filled in."))
}

/// Translate a 1-based position into a stored index
fn resolve_position(library: &Library<FileStorage>, position: usize) -> Result<usize, AppError> {
    if position == 0 || position > library.len() {
        return Err(ShelfError::invalid_index(position, library.len()).into());
    }
    Ok(position - 1)
}

pub fn run_add(ctx: &Context, args: AddArgs) -> Result<(), AppError> {
    let mut library = ctx.open_library()?;

    let id = library.add(&args.title, &args.author)?.ok_or_else(blank_fields)?;
    let position = library.position(id).map(|i| i + 1).unwrap_or(library.len());
    if let Some(book) = library.get(id) {
        println!("✓ Added #{position}: {book}");
    }
    Ok(())
}

pub fn run_edit(ctx: &Context, args: EditArgs) -> Result<(), AppError> {
    let mut library = ctx.open_library()?;
    let index = resolve_position(&library, args.position)?;
    let id = library.id_at(index)?;

    if !library.update(id, &args.title, &args.author)? {
        return Err(blank_fields());
    }
    if let Some(book) = library.get(id) {
        println!("✓ Updated #{}: {book}", args.position);
    }
    Ok(())
}

pub fn run_remove(ctx: &Context, args: RemoveArgs) -> Result<(), AppError> {
    let mut library = ctx.open_library()?;
    let index = resolve_position(&library, args.position)?;

    match library.remove_at(index)? {
        Some(book) => {
            println!("✓ Removed {book}");
            Ok(())
        }
        None => Err(ShelfError::invalid_index(args.position, library.len()).into()),
    }
}

pub fn run_list(ctx: &Context, args: ListArgs) -> Result<(), AppError> {
    let library = ctx.open_library()?;

    let query = ViewQuery::new(
        args.query.clone().unwrap_or_default(),
        args.sort.map(SortField::from).unwrap_or(ctx.config.view.sort_field),
        args.order.map(SortOrder::from).unwrap_or(ctx.config.view.sort_order),
    );
    let visible = query.apply(library.books());

    if args.json {
        let entries: Vec<ListEntry<'_>> = visible
            .iter()
            .map(|entry| ListEntry {
                position: entry.index + 1,
                id: entry.book.id.to_string(),
                title: &entry.book.title,
                author: &entry.book.author,
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries).map_err(AppError::io)?;
        println!("{json}");
        return Ok(());
    }

    if library.is_empty() {
        println!("No books yet. Add one with: shelf add <TITLE> <AUTHOR>");
        return Ok(());
    }
    if visible.is_empty() {
        println!("No books match \"{}\".", query.text);
        return Ok(());
    }

    let width = library.len().to_string().len();
    for entry in &visible {
        println!("{:>width$}. {}", entry.index + 1, entry.book);
    }
    Ok(())
}
