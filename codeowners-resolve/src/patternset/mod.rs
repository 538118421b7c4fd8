//! An NFA over path segments that matches a whole set of patterns in one
//! pass, used to resolve many paths at once.

mod builder;
mod nfa;
mod tree_matcher;

pub(crate) use self::builder::Builder;
pub(crate) use self::tree_matcher::TreeMatcher;
