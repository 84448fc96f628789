pub mod errors;
pub mod mutex;
pub mod normal_form;
pub mod parse;
pub mod proven_set;
pub mod token;
pub mod utils;

pub use errors::FormError;
pub use normal_form::{Cnf, Conjunctive, Disjunctive, Dnf, NormalForm, Orientation};
pub use proven_set::{Prop, ProvenSet};
