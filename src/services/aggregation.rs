use std::collections::HashMap;

use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    Database,
};
use serde::Serialize;

use crate::models::poll_models::Poll;
use crate::models::vote_record_models::VoteRecord;
use crate::utils::error::{AppError, AppResult};

/// Per-option counts and total for one poll, derived on demand from the
/// committed vote records. Never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub poll_id: String,
    pub results: Vec<OptionCount>,
    pub total_votes: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionCount {
    pub id: String,
    pub text: String,
    pub vote_count: i64,
}

pub async fn compute(db: &Database, poll_id: &str) -> AppResult<Aggregate> {
    let obj_id = ObjectId::parse_str(poll_id)
        .map_err(|_| AppError::BadRequest("Invalid poll id".to_string()))?;

    let poll = db
        .collection::<Poll>("polls")
        .find_one(doc! { "_id": obj_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

    compute_for_poll(db, &poll).await
}

/// Counts every committed vote for the poll's options in a single
/// `$match`/`$group` pass, so each option's count reflects one snapshot of
/// the store rather than a sequence of separate reads.
pub async fn compute_for_poll(db: &Database, poll: &Poll) -> AppResult<Aggregate> {
    let option_ids: Vec<String> = poll.options.iter().map(|o| o.id.clone()).collect();

    let pipeline = vec![
        doc! { "$match": { "option_id": { "$in": option_ids } } },
        doc! { "$group": { "_id": "$option_id", "count": { "$sum": 1 } } },
    ];

    let votes = db.collection::<VoteRecord>("vote_records");
    let mut cursor = votes.aggregate(pipeline).await?;

    let mut counts: HashMap<String, i64> = HashMap::new();
    while let Some(group) = cursor.try_next().await? {
        let option_id = group.get_str("_id").unwrap_or_default().to_string();
        counts.insert(option_id, count_field(&group));
    }

    Ok(assemble(poll, &counts))
}

fn count_field(group: &Document) -> i64 {
    match group.get("count") {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        _ => 0,
    }
}

/// Shapes raw per-option counts into an `Aggregate`, zero-filling options
/// nobody has voted for and summing the total.
pub fn assemble(poll: &Poll, counts: &HashMap<String, i64>) -> Aggregate {
    let results: Vec<OptionCount> = poll
        .options
        .iter()
        .map(|option| OptionCount {
            id: option.id.clone(),
            text: option.text.clone(),
            vote_count: counts.get(&option.id).copied().unwrap_or(0),
        })
        .collect();

    let total_votes = results.iter().map(|r| r.vote_count).sum();

    Aggregate {
        poll_id: poll.id.to_hex(),
        results,
        total_votes,
    }
}

/// Aggregate for a poll with no votes yet.
pub fn zeroed(poll: &Poll) -> Aggregate {
    assemble(poll, &HashMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::poll_models::PollOption;
    use chrono::Utc;

    fn poll(option_ids: &[(&str, &str)]) -> Poll {
        let now = Utc::now();
        Poll {
            id: ObjectId::new(),
            question: "Favorite language?".to_string(),
            creator_id: ObjectId::new(),
            options: option_ids
                .iter()
                .map(|(id, text)| PollOption {
                    id: (*id).to_string(),
                    text: (*text).to_string(),
                })
                .collect(),
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn zero_fills_options_without_votes() {
        let poll = poll(&[("a", "Rust"), ("b", "Go")]);
        let counts = HashMap::from([("a".to_string(), 3)]);

        let aggregate = assemble(&poll, &counts);

        assert_eq!(aggregate.results[0].vote_count, 3);
        assert_eq!(aggregate.results[1].vote_count, 0);
        assert_eq!(aggregate.total_votes, 3);
    }

    #[test]
    fn keeps_option_order_and_sums_totals() {
        let poll = poll(&[("a", "Rust"), ("b", "Go"), ("c", "Zig")]);
        let counts = HashMap::from([
            ("a".to_string(), 1),
            ("b".to_string(), 4),
            ("c".to_string(), 2),
        ]);

        let aggregate = assemble(&poll, &counts);

        let ids: Vec<&str> = aggregate.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(aggregate.total_votes, 7);
    }

    #[test]
    fn ignores_counts_for_unknown_options() {
        let poll = poll(&[("a", "Rust")]);
        let counts = HashMap::from([("a".to_string(), 2), ("stray".to_string(), 9)]);

        let aggregate = assemble(&poll, &counts);

        assert_eq!(aggregate.results.len(), 1);
        assert_eq!(aggregate.total_votes, 2);
    }

    #[test]
    fn zeroed_has_no_votes() {
        let poll = poll(&[("a", "Rust"), ("b", "Go")]);

        let aggregate = zeroed(&poll);

        assert!(aggregate.results.iter().all(|r| r.vote_count == 0));
        assert_eq!(aggregate.total_votes, 0);
    }

    #[test]
    fn serializes_to_camel_case() {
        let poll = poll(&[("a", "Rust")]);
        let value = serde_json::to_value(zeroed(&poll)).unwrap();

        assert!(value.get("pollId").is_some());
        assert!(value.get("totalVotes").is_some());
        assert!(value["results"][0].get("voteCount").is_some());
    }
}
