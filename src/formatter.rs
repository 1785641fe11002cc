use crate::github::Event;

const BODY_PREVIEW_MAX_LEN: usize = 80;

/// Renders an already-sorted event list as markdown, grouped by day.
pub fn format_markdown(title: &str, events: &[Event], compact: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {title}\n\n"));

    if events.is_empty() {
        out.push_str("_No activity found._\n");
        return out;
    }

    let mut current_day: Option<chrono::NaiveDate> = None;

    for event in events {
        let day = event.dt.date_naive();
        if !compact && current_day != Some(day) {
            current_day = Some(day);
            if !out.ends_with("\n\n") {
                out.push('\n');
            }
            out.push_str(&format!("## {day}\n\n"));
        }

        let time = event.dt.format("%H:%M");
        if compact {
            out.push_str(&format!("- {day} {time} {}", event.summary));
        } else {
            out.push_str(&format!("- {time} {}", event.summary));
        }
        if let Some(link) = event.link.as_ref() {
            out.push_str(&format!(" {link}"));
        }
        out.push('\n');

        if let Some(body) = event.body.as_ref()
            && let Some(line) = first_line_preview(body)
        {
            out.push_str("  > ");
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

/// One serialized event per line.
pub fn format_json(events: &[Event]) -> anyhow::Result<String> {
    let mut out = String::new();
    for event in events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    Ok(out)
}

fn first_line_preview(body: &str) -> Option<String> {
    let line = body.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    if line.chars().count() <= BODY_PREVIEW_MAX_LEN {
        return Some(line.to_string());
    }
    let mut out: String = line.chars().take(BODY_PREVIEW_MAX_LEN).collect();
    out.push_str("...");
    Some(out)
}
