pub mod city_codes;
pub mod fares;
pub mod query;
pub mod storage;
pub mod store;
