//! Text command router
//!
//! Table-driven dispatch from command name to handler, keeping line parsing
//! separate from command logic. Handlers take a validated argument list and
//! reply with formatted text; they read only from the directory store except
//! for the explicit refresh command.

use crate::orchestrator::{Reconciler, RefreshKind};
use crate::store::DirectoryStore;
use futures::future::BoxFuture;
use guilddir_common::DirectoryRecord;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Collaborators a command handler may touch
#[derive(Clone)]
pub struct CommandContext {
    pub store: Arc<DirectoryStore>,
    pub reconciler: Arc<Reconciler>,
}

type Handler = for<'a> fn(&'a CommandContext, Vec<String>) -> BoxFuture<'a, String>;

struct CommandEntry {
    usage: &'static str,
    handler: Handler,
}

pub struct CommandRouter {
    table: HashMap<&'static str, CommandEntry>,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        let mut table: HashMap<&'static str, CommandEntry> = HashMap::new();
        table.insert(
            "server",
            CommandEntry {
                usage: "!server <keyword> [-d]",
                handler: server_handler,
            },
        );
        table.insert(
            "serverlist",
            CommandEntry {
                usage: "!serverlist",
                handler: server_list_handler,
            },
        );
        table.insert(
            "updateservers",
            CommandEntry {
                usage: "!updateservers",
                handler: update_servers_handler,
            },
        );
        Self { table }
    }

    /// Route one inbound line. Lines not starting with `!` are ignored
    /// (the transport may carry ordinary chatter).
    pub async fn dispatch(&self, ctx: &CommandContext, line: &str) -> Option<String> {
        let (name, args) = parse_line(line)?;
        if name == "help" {
            return Some(self.help_text());
        }
        let reply = match self.table.get(name.as_str()) {
            Some(entry) => (entry.handler)(ctx, args).await,
            None => format!("Unknown command '{name}'. Try !help."),
        };
        Some(reply)
    }

    /// Reply for `!help`: every command with its usage line
    fn help_text(&self) -> String {
        let mut usages: Vec<&str> = self.table.values().map(|e| e.usage).collect();
        usages.sort_unstable();
        format!("Supported commands:\n{}", usages.join("\n"))
    }
}

/// Split a `!`-prefixed line into a lowercase command name and its raw
/// arguments. Returns `None` for non-command lines.
pub fn parse_line(line: &str) -> Option<(String, Vec<String>)> {
    let rest = line.trim().strip_prefix('!')?;
    let mut parts = rest.split_whitespace();
    let name = parts.next().filter(|n| !n.is_empty())?.to_lowercase();
    Some((name, parts.map(str::to_string).collect()))
}

fn server_handler(ctx: &CommandContext, args: Vec<String>) -> BoxFuture<'_, String> {
    Box::pin(server_command(ctx, args))
}

fn server_list_handler(ctx: &CommandContext, args: Vec<String>) -> BoxFuture<'_, String> {
    Box::pin(server_list_command(ctx, args))
}

fn update_servers_handler(ctx: &CommandContext, args: Vec<String>) -> BoxFuture<'_, String> {
    Box::pin(update_servers_command(ctx, args))
}

async fn server_command(ctx: &CommandContext, args: Vec<String>) -> String {
    if args.is_empty() || args.len() > 2 {
        return "Usage: !server <keyword> [-d]".to_string();
    }
    let keyword = &args[0];
    let debug = args.get(1).map(String::as_str) == Some("-d");
    match ctx.store.lookup(keyword) {
        Some(record) if debug => format_record_debug(&record),
        Some(record) => format_record(&record),
        None => format!("Server with keyword '{keyword}' not found."),
    }
}

async fn server_list_command(ctx: &CommandContext, _args: Vec<String>) -> String {
    let snapshot = match ctx.store.snapshot() {
        Some(s) if !s.is_empty() => s,
        _ => return "No servers found.".to_string(),
    };
    let mut keywords: Vec<&DirectoryRecord> = snapshot.records().collect();
    keywords.sort_by(|a, b| a.keyword.cmp(&b.keyword));

    let mut out = String::from("Server list:\n");
    for record in keywords {
        if record.aliases.is_empty() {
            let _ = writeln!(out, "{}", record.keyword);
        } else {
            let aliases: Vec<&str> = record.aliases.iter().map(String::as_str).collect();
            let _ = writeln!(out, "{} [{}]", record.keyword, aliases.join(", "));
        }
    }
    out.trim_end().to_string()
}

async fn update_servers_command(ctx: &CommandContext, _args: Vec<String>) -> String {
    match ctx.reconciler.reconcile(RefreshKind::Manual).await {
        Ok(summary) => format!(
            "Server directory reloaded from {} ({} kept, {} removed).",
            summary.source, summary.kept, summary.removed
        ),
        Err(e) => format!("Refresh failed: {e}"),
    }
}

/// Plain reply: name, description if any, invite link
pub fn format_record(record: &DirectoryRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**{}**", record.display_name);
    if !record.description.is_empty() {
        let _ = writeln!(out, "{}", record.description);
    }
    let _ = writeln!(out);
    out.push_str(&record.invite_reference);
    out
}

/// Debug reply: every stored field, invite link suppressed from embedding
pub fn format_record_debug(record: &DirectoryRecord) -> String {
    let aliases: Vec<&str> = record.aliases.iter().map(String::as_str).collect();
    format!(
        "keyword: '{}'\ndisplayName: '{}'\nexternalId: '{}'\ndescription: '{}'\ninviteLink: '<{}>'\naliases: [{}]",
        record.keyword,
        record.display_name,
        record.external_id,
        record.description,
        record.invite_reference,
        aliases.join(", ")
    )
}
