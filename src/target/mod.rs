//! Target enumeration
//!
//! Turns a base URL and a wordlist into the sequence of URLs to probe.

mod enumerate;
mod wordlist;

pub use enumerate::{enumerate, normalize_base_url, PathEnumerator, Target, Targets};
pub use wordlist::load_wordlist;
