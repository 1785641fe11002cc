/// One normalized activity record, shared by the feed and GDPR parsers.
/// `eid` is unique per source record, not across the two ingestion paths.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Event {
    pub dt: chrono::DateTime<chrono::Utc>,
    pub summary: String,
    pub eid: String,
    pub link: Option<String>,
    pub body: Option<String>,
}
