/// CRUD and cascade behaviour against a live database
pub mod crud_tests;
