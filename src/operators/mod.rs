//! The operator catalog
//!
//! One module per operator. Traditional operators work inside method bodies;
//! class-level operators (currently only JTD) mutate declarations and run in
//! a separate pass over the unit.

mod aois;
mod aoiu;
mod aorb;
mod asrs;
mod coi;
mod cor;
mod jtd;
mod lod;
mod loi;
mod odl;
mod ror;
mod sdl;

pub use aois::Aois;
pub use aoiu::Aoiu;
pub use aorb::Aorb;
pub use asrs::Asrs;
pub use coi::Coi;
pub use cor::Cor;
pub use jtd::Jtd;
pub use lod::Lod;
pub use loi::Loi;
pub use odl::Odl;
pub use ror::Ror;
pub use sdl::Sdl;

use crate::mutator::{Mutator, OpId};

/// Instantiate the operator behind an id.
pub fn build(op: OpId) -> Box<dyn Mutator> {
    match op {
        OpId::Aois => Box::new(Aois::default()),
        OpId::Aoiu => Box::new(Aoiu),
        OpId::Aorb => Box::new(Aorb),
        OpId::Asrs => Box::new(Asrs),
        OpId::Coi => Box::new(Coi),
        OpId::Cor => Box::new(Cor),
        OpId::Jtd => Box::new(Jtd),
        OpId::Lod => Box::new(Lod),
        OpId::Loi => Box::new(Loi),
        OpId::Odl => Box::new(Odl),
        OpId::Ror => Box::new(Ror),
        OpId::Sdl => Box::new(Sdl),
    }
}

/// One-line description for the catalog listing.
pub fn describe(op: OpId) -> &'static str {
    match op {
        OpId::Aois => "insert ++/-- around arithmetic variable reads",
        OpId::Aoiu => "insert unary minus before arithmetic operands",
        OpId::Aorb => "replace a binary arithmetic operator",
        OpId::Asrs => "replace a compound assignment operator",
        OpId::Coi => "negate a branch or loop guard",
        OpId::Cor => "swap && and ||",
        OpId::Jtd => "delete an explicit this-qualifier",
        OpId::Lod => "delete a bitwise complement",
        OpId::Loi => "insert a bitwise complement before integral reads",
        OpId::Odl => "delete one operand of a binary or unary expression",
        OpId::Ror => "replace a relational operator or force its outcome",
        OpId::Sdl => "delete a statement",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operator_is_buildable_and_described() {
        for op in OpId::ALL {
            let _ = build(op);
            assert!(!describe(op).is_empty());
        }
    }
}
