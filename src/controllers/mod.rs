pub mod poll_controllers;
pub mod user_controllers;
pub mod vote_controllers;
