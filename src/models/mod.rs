pub mod jobmodel;
pub mod servicemodel;
pub mod statsmodel;
pub mod usermodel;
