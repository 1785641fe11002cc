mod formatter;
mod github;

use crate::github::prelude::*;
use clap::Parser;

const MIN_CHECK_EVENTS: usize = 100;

#[derive(clap::Parser, Debug)]
#[command(version, about = "GitHub activity timeline builder")]
struct Cli {
    #[arg(
        long,
        value_name = "DIR",
        env = "GH_EVENTS_DIR",
        help = "Directory with polled events feed JSON files"
    )]
    events_dir: std::path::PathBuf,
    #[arg(
        long,
        value_name = "DIR",
        env = "GH_GDPR_DIR",
        help = "Directory with GDPR export JSON files"
    )]
    gdpr_dir: Option<std::path::PathBuf>,
    #[arg(long, help = "Emit events as JSON lines")]
    json: bool,
    #[arg(short, long, help = "Use compact list output")]
    compact: bool,
    #[arg(long, help = "Print every feed event and verify the feed is non-trivial")]
    check: bool,
}

fn main() -> anyhow::Result<()> {
    let Cli {
        events_dir,
        gdpr_dir,
        json,
        compact,
        check,
    } = Cli::parse();

    let events = get_events(&events_dir)?;

    if check {
        for event in &events {
            println!("{event:?}");
        }
        anyhow::ensure!(
            events.len() > MIN_CHECK_EVENTS,
            "suspiciously few events: {}",
            events.len()
        );
        return Ok(());
    }

    let gdpr_events = match gdpr_dir {
        Some(dir) => Some(collect_gdpr_events(&dir)?),
        None => None,
    };

    if json {
        print!("{}", crate::formatter::format_json(&events)?);
        if let Some(gdpr_events) = gdpr_events {
            print!("{}", crate::formatter::format_json(&gdpr_events)?);
        }
        return Ok(());
    }

    let mut output = crate::formatter::format_markdown("feed", &events, compact);
    if let Some(gdpr_events) = gdpr_events {
        output.push('\n');
        output.push_str(&crate::formatter::format_markdown(
            "GDPR export",
            &gdpr_events,
            compact,
        ));
    }
    print!("{output}");

    Ok(())
}

// The two sources stay in separate sections; merging them is left to
// downstream consumers.
fn collect_gdpr_events(dir: &std::path::Path) -> anyhow::Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut failures = 0usize;
    for result in iter_gdpr_events(dir)? {
        match result {
            Ok(event) => events.push(event),
            Err(err) => {
                failures += 1;
                eprintln!("skipping GDPR record: {err:#}");
            }
        }
    }
    if failures > 0 {
        eprintln!("{failures} GDPR record(s) skipped");
    }
    events.sort_by_key(|event| event.dt);
    Ok(events)
}
