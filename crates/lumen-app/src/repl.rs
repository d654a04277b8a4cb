//! Line-driven shell.
//!
//! Each input line is either a `:command` or address-bar text. Commands
//! produce a [`CommandOutput`] which is rendered to plain lines, the same
//! split the desktop terminal uses between running a command and drawing
//! its output.

use std::io::{self, BufRead, Write};

use crate::app_state::ShellContext;
use crate::engine::WebEngine;

const HELP: &str = "\
:back  :forward  :home  :reload
:history [query]  :clear-history
:bookmark  :bookmarks
:suggest <text>  :next  :prev  :accept
:tab [address]  :tabs  :switch <n>
:close  :close-others  :close-all
:help  :quit
Anything else is typed into the address bar.";

/// Result of one shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Text(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    None,
    Quit,
}

impl CommandOutput {
    fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    fn table(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self::Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }
}

/// Run one line against the shell.
pub fn execute<E: WebEngine>(line: &str, ctx: &mut ShellContext<E>) -> CommandOutput {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return match ctx.submit_address(line) {
            Some(url) => CommandOutput::text(format!("-> {url}")),
            None => CommandOutput::None,
        };
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "back" => match ctx.go_back() {
            Some(url) => CommandOutput::text(format!("<- {url}")),
            None => CommandOutput::text("Nothing to go back to."),
        },
        "forward" => match ctx.go_forward() {
            Some(url) => CommandOutput::text(format!("-> {url}")),
            None => CommandOutput::text("Nothing to go forward to."),
        },
        "home" => CommandOutput::text(format!("-> {}", ctx.go_home())),
        "reload" => {
            if ctx.reload() {
                CommandOutput::text("Reloading.")
            } else {
                CommandOutput::text("No tab to reload.")
            }
        },
        "history" => history_table(ctx, arg),
        "clear-history" => {
            ctx.clear_history();
            CommandOutput::text("History cleared.")
        },
        "bookmark" => match ctx.bookmark_current() {
            Some(b) => CommandOutput::text(format!("Bookmarked {}", b.title)),
            None => CommandOutput::text("Nothing to bookmark."),
        },
        "bookmarks" => CommandOutput::table(
            &["Title", "URL", "Folder"],
            ctx.bookmarks()
                .iter()
                .map(|b| {
                    vec![
                        b.title.clone(),
                        b.url.clone(),
                        b.folder.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        "suggest" => {
            let list = ctx.update_suggestions(arg);
            if list.is_empty() {
                return CommandOutput::text("No suggestions.");
            }
            CommandOutput::table(
                &["", "Title", "URL"],
                list.items()
                    .iter()
                    .map(|s| vec![s.kind.glyph().to_string(), s.title.clone(), s.url.clone()])
                    .collect(),
            )
        },
        "next" => match ctx.select_next_suggestion() {
            Some(s) => CommandOutput::text(s.display_text()),
            None => CommandOutput::text("No suggestions."),
        },
        "prev" => match ctx.select_previous_suggestion() {
            Some(s) => CommandOutput::text(s.display_text()),
            None => CommandOutput::text("No suggestions."),
        },
        "accept" => match ctx.accept_suggestion() {
            Some(url) => CommandOutput::text(format!("-> {url}")),
            None => CommandOutput::text("No suggestion selected."),
        },
        "tab" => {
            let address = (!arg.is_empty()).then_some(arg);
            let tab = ctx.open_tab(address);
            CommandOutput::text(format!("Opened tab {tab}"))
        },
        "tabs" => tabs_table(ctx),
        "switch" => {
            let target = arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| ctx.tabs().iter().nth(i).map(|t| t.id));
            match target {
                Some(tab) if ctx.select_tab(tab) => CommandOutput::text(format!("Switched to {tab}")),
                _ => CommandOutput::text(format!("No tab {arg}")),
            }
        },
        "close" => {
            if ctx.close_selected_tab() {
                CommandOutput::text("Tab closed.")
            } else {
                CommandOutput::text("No tab to close.")
            }
        },
        "close-others" => match ctx.tabs().selected_id() {
            Some(tab) => CommandOutput::text(format!("Closed {} tabs.", ctx.close_other_tabs(tab))),
            None => CommandOutput::text("No tab open."),
        },
        "close-all" => CommandOutput::text(format!("Closed {} tabs.", ctx.close_all_tabs())),
        "help" => CommandOutput::text(HELP),
        "quit" | "q" => CommandOutput::Quit,
        other => CommandOutput::text(format!("Unknown command :{other} (try :help)")),
    }
}

fn history_table<E: WebEngine>(ctx: &ShellContext<E>, query: &str) -> CommandOutput {
    let history = ctx.history();
    let current = history.current().map(|e| e.id.clone());
    let entries = if query.is_empty() {
        history.entries().to_vec()
    } else {
        history.search(query)
    };
    CommandOutput::table(
        &["", "Title", "URL", "Visited"],
        entries
            .into_iter()
            .map(|e| {
                let marker = if Some(&e.id) == current.as_ref() { "*" } else { "" };
                vec![
                    marker.to_string(),
                    e.title,
                    e.url,
                    e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                ]
            })
            .collect(),
    )
}

fn tabs_table<E: WebEngine>(ctx: &ShellContext<E>) -> CommandOutput {
    let selected = ctx.tabs().selected_id();
    CommandOutput::table(
        &["", "#", "Title", "URL", "State", "Back/Fwd"],
        ctx.tabs()
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let marker = if Some(tab.id) == selected { "*" } else { "" };
                let state = if tab.loading {
                    format!("{}%", tab.progress)
                } else {
                    String::new()
                };
                let position = ctx
                    .tab_history(tab.id)
                    .and_then(|h| h.cursor().map(|c| format!("{}/{}", c + 1, h.len())))
                    .unwrap_or_default();
                vec![
                    marker.to_string(),
                    (i + 1).to_string(),
                    tab.title.clone(),
                    tab.url.clone(),
                    state,
                    position,
                ]
            })
            .collect(),
    )
}

/// Output lines for `output`.
pub fn render(output: &CommandOutput) -> Vec<String> {
    match output {
        CommandOutput::Text(text) => text.lines().map(str::to_string).collect(),
        CommandOutput::Table { headers, rows } => {
            let mut lines = vec![headers.join(" | ")];
            lines.extend(rows.iter().map(|row| row.join(" | ")));
            lines
        },
        CommandOutput::None | CommandOutput::Quit => Vec::new(),
    }
}

/// Read lines from `input` until `:quit` or end of input, printing results
/// and the status line to `out`.
pub fn run<E, R, W>(ctx: &mut ShellContext<E>, input: R, mut out: W) -> io::Result<()>
where
    E: WebEngine,
    R: BufRead,
    W: Write,
{
    ctx.pump();
    write!(out, "lumen> ")?;
    out.flush()?;
    for line in input.lines() {
        let output = execute(&line?, ctx);
        if output == CommandOutput::Quit {
            break;
        }
        for l in render(&output) {
            writeln!(out, "{l}")?;
        }
        ctx.pump();
        if !ctx.status().is_empty() {
            writeln!(out, "[{}]", ctx.status())?;
        }
        write!(out, "lumen> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}
