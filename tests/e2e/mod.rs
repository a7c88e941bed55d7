pub mod sync_suite;
