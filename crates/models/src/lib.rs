pub mod errors;
pub mod db;
pub mod user;
pub mod track;
pub mod like;

#[cfg(test)]
mod tests;
