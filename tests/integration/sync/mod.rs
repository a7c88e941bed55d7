pub mod agent_test;
