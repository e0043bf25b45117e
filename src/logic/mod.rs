pub mod algebra;
pub mod alpha;
pub mod prop;
pub mod rewrite;
pub mod unify;
