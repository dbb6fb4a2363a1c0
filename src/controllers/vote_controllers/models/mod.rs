use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub voter_id: Option<String>,
    pub option_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoteResponse {
    pub id: String,
    pub poll_id: String,
    pub question: String,
    pub option_id: String,
    pub option_text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vote_fields_deserialize_as_none() {
        let payload: CastVoteRequest = serde_json::from_str(r#"{"voterId":"abc"}"#).unwrap();
        assert_eq!(payload.voter_id.as_deref(), Some("abc"));
        assert!(payload.option_id.is_none());

        let empty: CastVoteRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.voter_id.is_none());
        assert!(empty.option_id.is_none());
    }
}
