//! Route handlers outside the public JSON API.

pub mod cron;
