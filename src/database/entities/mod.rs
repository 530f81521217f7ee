pub mod assessments;
pub mod conditions;
pub mod permissions;
pub mod question_groups;
pub mod questions;
pub mod surveys;
