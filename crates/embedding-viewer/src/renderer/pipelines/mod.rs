pub mod bloom;
pub mod points;
