//! Unit tests for the dispatch module

mod mock_transport_tests;
mod template_tests;
