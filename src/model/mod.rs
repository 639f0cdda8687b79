pub mod issue;
pub mod report;
pub mod web;
