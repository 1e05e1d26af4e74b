pub mod google_oauth;
