use std::path::Path;

use anyhow::Context;
use valq::query_value;

use super::common::{json_files_sorted, parse_dt, read_json_array};
use super::event::Event;

// Unknown tags are not an error: the raw tag becomes the summary, with no
// link. DeleteEvent and PublicEvent share that fallback.
fn summarize(record: &serde_json::Value) -> anyhow::Result<(String, Option<String>)> {
    let tag = query_value!(record."type" -> str).context("feed record missing type")?;
    let repo_name =
        query_value!(record.repo.name -> str).context("feed record missing repo.name")?;

    let derived = match tag {
        "ForkEvent" => {
            let url = query_value!(record.payload.forkee.html_url -> str)
                .context("ForkEvent missing payload.forkee.html_url")?;
            (format!("forked {repo_name}"), Some(url.to_string()))
        }
        "PushEvent" => (format!("pushed to {repo_name}"), None),
        "WatchEvent" => (format!("watching {repo_name}"), None),
        "CreateEvent" => (format!("created {repo_name}"), None),
        "PullRequestEvent" => {
            let action = query_value!(record.payload.action -> str)
                .context("PullRequestEvent missing payload.action")?;
            let title = query_value!(record.payload.pull_request.title -> str)
                .context("PullRequestEvent missing payload.pull_request.title")?;
            let url = query_value!(record.payload.pull_request.html_url -> str)
                .context("PullRequestEvent missing payload.pull_request.html_url")?;
            (format!("{action} PR {title}"), Some(url.to_string()))
        }
        "IssuesEvent" => {
            let action = query_value!(record.payload.action -> str)
                .context("IssuesEvent missing payload.action")?;
            let title = query_value!(record.payload.issue.title -> str)
                .context("IssuesEvent missing payload.issue.title")?;
            let url = query_value!(record.payload.issue.html_url -> str)
                .context("IssuesEvent missing payload.issue.html_url")?;
            (format!("{action} issue {title}"), Some(url.to_string()))
        }
        "IssueCommentEvent" => {
            let title = query_value!(record.payload.issue.title -> str)
                .context("IssueCommentEvent missing payload.issue.title")?;
            let url = query_value!(record.payload.comment.html_url -> str)
                .context("IssueCommentEvent missing payload.comment.html_url")?;
            (format!("commented on issue {title}"), Some(url.to_string()))
        }
        "ReleaseEvent" => {
            let action = query_value!(record.payload.action -> str)
                .context("ReleaseEvent missing payload.action")?;
            let tag_name = query_value!(record.payload.release.tag_name -> str)
                .context("ReleaseEvent missing payload.release.tag_name")?;
            let url = query_value!(record.payload.release.html_url -> str)
                .context("ReleaseEvent missing payload.release.html_url")?;
            (format!("{action} {repo_name} [{tag_name}]"), Some(url.to_string()))
        }
        other => (other.to_string(), None),
    };

    Ok(derived)
}

/// Maps one raw feed record to an [`Event`]. Fails when a required field is
/// absent or malformed; [`iter_events`] contains such failures per record.
pub fn parse_event(record: &serde_json::Value) -> anyhow::Result<Event> {
    let (summary, link) = summarize(record)?;
    let created_at =
        query_value!(record.created_at -> str).context("feed record missing created_at")?;
    let eid = query_value!(record.id -> str)
        .context("feed record missing id")?
        .to_string();
    // Comment bodies ride along regardless of the type tag.
    let body = query_value!(record.payload.comment.body -> str).map(str::to_string);

    Ok(Event {
        dt: parse_dt(created_at)?,
        summary,
        eid,
        link,
        body,
    })
}

/// Lazily yields one `Event`-or-error per feed record, over every `*.json`
/// file in `dir` in filename order. Failures never abort the sequence.
pub fn iter_events(
    dir: &Path,
) -> anyhow::Result<impl Iterator<Item = anyhow::Result<Event>> + use<>> {
    let files = json_files_sorted(dir)?;
    Ok(files.into_iter().flat_map(|path| {
        match read_json_array(&path) {
            Ok(records) => Box::new(records.into_iter().map(|record| parse_event(&record)))
                as Box<dyn Iterator<Item = anyhow::Result<Event>>>,
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }))
}

/// Materializes the whole feed sorted ascending by timestamp. Failed records
/// are dropped with a stderr warning.
pub fn get_events(dir: &Path) -> anyhow::Result<Vec<Event>> {
    let mut events = Vec::new();
    for result in iter_events(dir)? {
        match result {
            Ok(event) => events.push(event),
            Err(err) => eprintln!("skipping feed record: {err:#}"),
        }
    }
    events.sort_by_key(|event| event.dt);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn feed_record(tag: &str, payload: serde_json::Value) -> serde_json::Value {
        json!({
            "type": tag,
            "id": "22249084947",
            "repo": { "name": "o/r" },
            "created_at": "2019-10-15T22:50:57Z",
            "payload": payload,
        })
    }

    #[test]
    fn summarize_fork() {
        let record = feed_record(
            "ForkEvent",
            json!({ "forkee": { "html_url": "https://github.com/me/r" } }),
        );
        let (summary, link) = summarize(&record).unwrap();
        assert_eq!(summary, "forked o/r");
        assert_eq!(link.as_deref(), Some("https://github.com/me/r"));
    }

    #[test]
    fn summarize_linkless_tags() {
        for (tag, expected) in [
            ("PushEvent", "pushed to o/r"),
            ("WatchEvent", "watching o/r"),
            ("CreateEvent", "created o/r"),
        ] {
            let record = feed_record(tag, json!({}));
            let (summary, link) = summarize(&record).unwrap();
            assert_eq!(summary, expected);
            assert_eq!(link, None);
        }
    }

    #[test]
    fn summarize_pull_request() {
        let record = feed_record(
            "PullRequestEvent",
            json!({
                "action": "opened",
                "pull_request": { "title": "Add parser", "html_url": "https://github.com/o/r/pull/7" },
            }),
        );
        let (summary, link) = summarize(&record).unwrap();
        assert_eq!(summary, "opened PR Add parser");
        assert_eq!(link.as_deref(), Some("https://github.com/o/r/pull/7"));
    }

    #[test]
    fn summarize_issues() {
        let record = feed_record(
            "IssuesEvent",
            json!({
                "action": "closed",
                "issue": { "title": "Bug", "html_url": "https://github.com/o/r/issues/1" },
            }),
        );
        let (summary, link) = summarize(&record).unwrap();
        assert_eq!(summary, "closed issue Bug");
        assert_eq!(link.as_deref(), Some("https://github.com/o/r/issues/1"));
    }

    #[test]
    fn summarize_issue_comment() {
        let record = feed_record(
            "IssueCommentEvent",
            json!({
                "issue": { "title": "Bug" },
                "comment": { "html_url": "https://github.com/o/r/issues/1#c2" },
            }),
        );
        let (summary, link) = summarize(&record).unwrap();
        assert_eq!(summary, "commented on issue Bug");
        assert_eq!(link.as_deref(), Some("https://github.com/o/r/issues/1#c2"));
    }

    #[test]
    fn summarize_release() {
        let record = feed_record(
            "ReleaseEvent",
            json!({
                "action": "published",
                "release": { "tag_name": "v1.2", "html_url": "https://github.com/o/r/releases/v1.2" },
            }),
        );
        let (summary, link) = summarize(&record).unwrap();
        assert_eq!(summary, "published o/r [v1.2]");
        assert_eq!(link.as_deref(), Some("https://github.com/o/r/releases/v1.2"));
    }

    #[test]
    fn summarize_falls_back_to_raw_tag() {
        for tag in ["DeleteEvent", "PublicEvent", "GollumEvent"] {
            let record = feed_record(tag, json!({}));
            let (summary, link) = summarize(&record).unwrap();
            assert_eq!(summary, tag);
            assert_eq!(link, None);
        }
    }

    #[test]
    fn parse_event_extracts_comment_body() {
        let record = feed_record(
            "IssueCommentEvent",
            json!({
                "issue": { "title": "Bug" },
                "comment": { "html_url": "https://github.com/o/r/issues/1#c2", "body": "lgtm" },
            }),
        );
        let event = parse_event(&record).unwrap();
        assert_eq!(event.eid, "22249084947");
        assert_eq!(
            event.dt,
            Utc.with_ymd_and_hms(2019, 10, 15, 22, 50, 57).unwrap()
        );
        assert_eq!(event.body.as_deref(), Some("lgtm"));
    }

    #[test]
    fn parse_event_requires_created_at() {
        let record = json!({
            "type": "PushEvent",
            "id": "1",
            "repo": { "name": "o/r" },
            "payload": {},
        });
        assert!(parse_event(&record).is_err());
    }

    fn push_record(id: &str, created_at: &str) -> serde_json::Value {
        json!({
            "type": "PushEvent",
            "id": id,
            "repo": { "name": "o/r" },
            "created_at": created_at,
            "payload": {},
        })
    }

    #[test]
    fn get_events_sorts_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let records = json!([
            push_record("2", "2019-10-16T00:00:00Z"),
            push_record("1", "2019-10-15T00:00:00Z"),
            push_record("3", "2019-10-17T00:00:00Z"),
        ]);
        std::fs::write(dir.path().join("events_0.json"), records.to_string()).unwrap();

        let events = get_events(dir.path()).unwrap();
        let eids: Vec<_> = events.iter().map(|event| event.eid.as_str()).collect();
        assert_eq!(eids, ["1", "2", "3"]);
    }

    #[test]
    fn iter_events_contains_per_record_failures() {
        let dir = tempfile::tempdir().unwrap();
        let records = json!([
            push_record("1", "2019-10-15T00:00:00Z"),
            { "type": "PushEvent", "id": "2", "repo": { "name": "o/r" }, "payload": {} },
            push_record("3", "2019-10-17T00:00:00Z"),
        ]);
        std::fs::write(dir.path().join("events_0.json"), records.to_string()).unwrap();

        let results: Vec<_> = iter_events(dir.path()).unwrap().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
