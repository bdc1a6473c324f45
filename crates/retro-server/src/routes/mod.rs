pub mod action_items;
pub mod events;
pub mod items;
pub mod orphans;
pub mod sprints;
