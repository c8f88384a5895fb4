pub mod commands;
pub mod pathfinding;
pub mod util;
