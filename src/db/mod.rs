pub mod db;
pub mod jobdb;
pub mod servicedb;
pub mod statsdb;
pub mod userdb;

#[cfg(test)]
pub mod memory;
