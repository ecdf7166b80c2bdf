// Candidate intake: resume documents and the profile fields collected before
// the interview starts.

pub mod document;
pub mod validation;
