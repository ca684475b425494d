//! Poll aggregate: a topic, a fixed ordered option list and a voting window.
//!
//! Options are immutable once a poll exists because votes reference them by
//! position only.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Error, PollStatus, UserId, VotingWindow};

/// Poll identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PollId(Uuid);

impl PollId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PollId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Validation failures raised while building a poll.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollValidationError {
    #[error("topic must not be blank")]
    BlankTopic,
    #[error("at least one option is required")]
    NoOptions,
    #[error("option {index} must not be blank")]
    BlankOption { index: usize },
    #[error("{field} is not a valid timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

impl PollValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankTopic => "topic",
            Self::NoOptions | Self::BlankOption { .. } => "options",
            Self::InvalidTimestamp { field, .. } => field,
        }
    }

    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankTopic => "blank_topic",
            Self::NoOptions => "empty_options",
            Self::BlankOption { .. } => "blank_option",
            Self::InvalidTimestamp { .. } => "invalid_timestamp",
        }
    }
}

impl From<PollValidationError> for Error {
    fn from(value: PollValidationError) -> Self {
        let mut details = json!({ "field": value.field(), "code": value.code() });
        if let PollValidationError::BlankOption { index } = value {
            details["index"] = json!(index);
        }
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

/// Parse a client-supplied timestamp.
///
/// Accepts RFC 3339 and the zone-less `YYYY-MM-DDTHH:MM[:SS]` shape emitted by
/// `datetime-local` inputs, which is read as UTC.
///
/// # Examples
/// ```
/// use livepoll::domain::parse_timestamp;
///
/// let a = parse_timestamp("startTime", "2024-05-01T09:30").expect("local shape");
/// let b = parse_timestamp("startTime", "2024-05-01T09:30:00Z").expect("rfc3339");
/// assert_eq!(a, b);
/// assert!(parse_timestamp("startTime", "tomorrow").is_err());
/// ```
pub fn parse_timestamp(
    field: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, PollValidationError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| PollValidationError::InvalidTimestamp {
            field,
            value: raw.to_owned(),
        })
}

/// Check a topic and option list without building a poll.
///
/// The topic must not be blank, at least one option is required and no
/// option may be blank after trimming.
pub fn validate_content(topic: &str, options: &[String]) -> Result<(), PollValidationError> {
    if topic.trim().is_empty() {
        return Err(PollValidationError::BlankTopic);
    }
    if options.is_empty() {
        return Err(PollValidationError::NoOptions);
    }
    match options.iter().position(|option| option.trim().is_empty()) {
        Some(index) => Err(PollValidationError::BlankOption { index }),
        None => Ok(()),
    }
}

/// Result summary written back onto a poll by the assist adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollAnalysis {
    /// Winning option as named by the generator.
    pub winner: String,
    /// Short narrative of the distribution.
    pub analysis: String,
    /// Suggested follow-up poll or action.
    pub follow_up: String,
}

/// Unvalidated input for [`Poll::new`].
#[derive(Debug, Clone)]
pub struct PollDraft {
    pub id: PollId,
    pub topic: String,
    pub options: Vec<String>,
    pub is_public: bool,
    pub window: VotingWindow,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// A stored poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    #[schema(value_type = String, format = Uuid)]
    id: PollId,
    topic: String,
    options: Vec<String>,
    is_public: bool,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[schema(value_type = String, format = Uuid)]
    created_by: UserId,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    analysis: Option<PollAnalysis>,
}

impl Poll {
    /// Validate a draft. Topic and options are trimmed.
    ///
    /// The window's ordering is accepted as given.
    pub fn new(draft: PollDraft) -> Result<Self, PollValidationError> {
        validate_content(&draft.topic, &draft.options)?;
        Ok(Self {
            id: draft.id,
            topic: draft.topic.trim().to_owned(),
            options: draft
                .options
                .iter()
                .map(|option| option.trim().to_owned())
                .collect(),
            is_public: draft.is_public,
            start_time: draft.window.start(),
            end_time: draft.window.end(),
            created_by: draft.created_by,
            created_at: draft.created_at,
            analysis: None,
        })
    }

    /// Rehydrate a poll from storage without re-validating it.
    pub fn from_stored(draft: PollDraft, analysis: Option<PollAnalysis>) -> Self {
        Self {
            id: draft.id,
            topic: draft.topic,
            options: draft.options,
            is_public: draft.is_public,
            start_time: draft.window.start(),
            end_time: draft.window.end(),
            created_by: draft.created_by,
            created_at: draft.created_at,
            analysis,
        }
    }

    pub fn id(&self) -> PollId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn window(&self) -> VotingWindow {
        VotingWindow::new(self.start_time, self.end_time)
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn analysis(&self) -> Option<&PollAnalysis> {
        self.analysis.as_ref()
    }

    /// Whether `index` addresses one of the options.
    pub fn has_option(&self, index: usize) -> bool {
        index < self.options.len()
    }

    /// Lifecycle status at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> PollStatus {
        self.window().status_at(now)
    }

    /// Attach an analysis annotation.
    pub fn set_analysis(&mut self, analysis: PollAnalysis) {
        self.analysis = Some(analysis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> PollDraft {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).single().expect("start");
        let end = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).single().expect("end");
        PollDraft {
            id: PollId::random(),
            topic: "  Best editor?  ".into(),
            options: vec!["vim".into(), " emacs ".into()],
            is_public: true,
            window: VotingWindow::new(start, end),
            created_by: UserId::random(),
            created_at: start,
        }
    }

    #[rstest]
    fn new_trims_topic_and_options(draft: PollDraft) {
        let poll = Poll::new(draft).expect("valid poll");
        assert_eq!(poll.topic(), "Best editor?");
        assert_eq!(poll.options(), ["vim", "emacs"]);
        assert!(poll.analysis().is_none());
    }

    #[rstest]
    fn rejects_blank_topic(mut draft: PollDraft) {
        draft.topic = "   ".into();
        assert_eq!(Poll::new(draft), Err(PollValidationError::BlankTopic));
    }

    #[rstest]
    fn rejects_empty_options(mut draft: PollDraft) {
        draft.options.clear();
        assert_eq!(Poll::new(draft), Err(PollValidationError::NoOptions));
    }

    #[rstest]
    fn rejects_blank_option_with_index(mut draft: PollDraft) {
        draft.options.push("\t".into());
        assert_eq!(
            Poll::new(draft),
            Err(PollValidationError::BlankOption { index: 2 })
        );
    }

    #[rstest]
    fn accepts_inverted_window(mut draft: PollDraft) {
        draft.window = VotingWindow::new(draft.window.end(), draft.window.start());
        assert!(Poll::new(draft).is_ok());
    }

    #[rstest]
    #[case("2024-05-01T09:30:00Z")]
    #[case("2024-05-01T11:30:00+02:00")]
    #[case("2024-05-01T09:30")]
    #[case("2024-05-01T09:30:00")]
    #[case(" 2024-05-01T09:30:00.000 ")]
    fn parses_supported_timestamp_shapes(#[case] raw: &str) {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().expect("ts");
        assert_eq!(parse_timestamp("startTime", raw), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("2024-13-01T09:30")]
    #[case("next tuesday")]
    fn rejects_unparseable_timestamps(#[case] raw: &str) {
        let err = parse_timestamp("endTime", raw).expect_err("invalid timestamp");
        assert_eq!(err.field(), "endTime");
        assert_eq!(err.code(), "invalid_timestamp");
    }

    #[rstest]
    fn validation_error_maps_to_invalid_request_with_details() {
        let error = Error::from(PollValidationError::BlankOption { index: 1 });
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
        let details = error.details().expect("details");
        assert_eq!(details["field"], "options");
        assert_eq!(details["code"], "blank_option");
        assert_eq!(details["index"], 1);
    }

    #[rstest]
    fn serialises_camel_case(draft: PollDraft) {
        let poll = Poll::new(draft).expect("valid poll");
        let value = serde_json::to_value(&poll).expect("serialise poll");
        assert_eq!(value["isPublic"], true);
        assert!(value.get("startTime").is_some());
        assert!(value.get("createdBy").is_some());
        assert!(value.get("analysis").is_none());
    }
}
