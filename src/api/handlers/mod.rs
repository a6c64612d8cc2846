pub mod accounts;
pub mod admin;
pub mod feed;
pub mod health;
pub mod transfers;
