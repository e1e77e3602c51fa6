//! Text rendering shared by the UI loop and the one-shot commands.

use agenda_core::{AlertSnapshot, AppContext};

pub const HELP: &[&str] = &[
    "Commands:",
    "  list            show today's schedule",
    "  next            show the next alert",
    "  test [HH:MM]    open a test alert",
    "  done HH:MM      toggle a task as done",
    "  reset           forget which alerts fired today",
    "  alerts on|off   enable or disable alerts (saved to config)",
    "  quit            stop the scheduler and exit",
    "While an alert is open, type the secret to close it.",
];

const RULE: &str = "============================================================";

pub fn alert_box(snapshot: &AlertSnapshot, at: &str) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        RULE.to_string(),
        format!("  {}  [{}]  {}", at, snapshot.color, snapshot.title.to_uppercase()),
        RULE.to_string(),
    ];
    lines.extend(snapshot.body_lines.iter().map(|line| format!("  * {line}")));
    lines.push(RULE.to_string());
    lines
}

/// One line per entry, marked `x` when done today and `!` when already fired.
pub fn schedule_lines(ctx: &AppContext) -> Vec<String> {
    let fired = ctx.fired_keys();
    let store = ctx.schedule();
    let schedule = store.schedule();

    let mut lines: Vec<String> = schedule
        .iter()
        .map(|(key, entry)| {
            let done = if ctx.is_done(key) { 'x' } else { ' ' };
            let rang = if fired.contains(&key) { '!' } else { ' ' };
            format!(
                "[{done}]{rang} {key}  {:<12} {}  ({})",
                entry.period,
                entry.title,
                entry.body_lines.join(", ")
            )
        })
        .collect();
    lines.push(format!("{} of {} done today", ctx.done_count(), schedule.len()));
    lines
}

pub fn next_line(ctx: &AppContext) -> String {
    if !ctx.is_alerts_enabled() {
        return "Alerts are disabled".to_string();
    }
    match ctx.next_upcoming() {
        Some((key, entry)) => format!("Next alert: {key} - {}", entry.title),
        None => "No more alerts today".to_string(),
    }
}
