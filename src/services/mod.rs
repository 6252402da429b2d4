pub mod daily_practice;
pub mod lists;
pub mod progress;
