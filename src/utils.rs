use crate::graph::NodeUpdate;
use crate::message::{Message, Role};

const TITLE_WIDTH: usize = 80;

fn title(label: &str) -> String {
    let label = format!(" {} ", label);
    let side = TITLE_WIDTH.saturating_sub(label.len()) / 2;
    let mut line = "=".repeat(side);
    line.push_str(&label);
    line.push_str(&"=".repeat(TITLE_WIDTH.saturating_sub(line.len())));
    line
}

/// Human-readable rendering of one message
pub fn format_message(message: &Message) -> String {
    let label = match message.role {
        Role::System => "System Message",
        Role::User => "Human Message",
        Role::Assistant => "Ai Message",
        Role::Tool => "Tool Message",
    };

    let mut out = title(label);
    out.push('\n');
    if let Some(name) = &message.name {
        out.push_str(&format!("Name: {}\n", name));
    }
    out.push('\n');
    out.push_str(&message.content);

    if message.has_tool_calls() {
        if !message.content.is_empty() {
            out.push('\n');
        }
        out.push_str("Tool Calls:");
        for call in &message.tool_calls {
            out.push_str(&format!(
                "\n  {} ({})\n Call ID: {}\n  Args: {}",
                call.name, call.id, call.id, call.arguments
            ));
        }
    }
    out
}

/// Rendering of a node update: its messages, or only the last one
pub fn format_update(update: &NodeUpdate, last_message: bool) -> String {
    let mut out = format!("Update from node {}:\n\n", update.node);

    let messages: &[Message] = if last_message {
        match update.appended.last() {
            Some(_) => &update.appended[update.appended.len() - 1..],
            None => &[],
        }
    } else {
        &update.appended
    };

    for message in messages {
        out.push_str(&format_message(message));
        out.push('\n');
    }
    out
}

pub fn pretty_print_update(update: &NodeUpdate, last_message: bool) {
    println!("{}", format_update(update, last_message));
}
