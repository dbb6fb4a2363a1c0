pub mod cast_vote;
pub mod get_results;
pub mod get_user_votes;
pub mod models;
