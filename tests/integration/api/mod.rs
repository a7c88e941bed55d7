pub mod data_test;
