pub mod admindtos;
pub mod jobdtos;
pub mod userdtos;
