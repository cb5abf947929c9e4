pub mod article;
pub mod clap;
pub mod comment;
pub mod faq;
pub mod favorite;
pub mod follow;
pub mod notification;
pub mod reading_history;
pub mod recommendation;
pub mod report;
pub mod response;
pub mod topic;
pub mod user;
