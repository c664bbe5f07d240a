//! Domain services behind the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Services own the model and maps orchestration so route handlers stay
//! focused on request decoding and status mapping. Both take their
//! collaborators as trait objects and hold no state between requests.

pub mod places;
pub mod vague;
pub mod voice;
