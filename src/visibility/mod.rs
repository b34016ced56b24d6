mod filter;

pub use filter::{find_visible, MatchSet, SearchCriteria};
