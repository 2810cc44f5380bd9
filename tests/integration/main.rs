//! Integration test harness. Run against a live server with:
//! `cargo test -- --ignored`

mod api_tests;
