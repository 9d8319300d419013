pub mod context;
pub mod eval;
pub mod interface;
pub mod ordering;
pub mod pesto;
pub mod picker;
pub mod see;
pub mod search;
pub mod tt;
